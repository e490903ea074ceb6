use criterion::{black_box, criterion_group, criterion_main, Criterion};
use npc_core::Coord;
use npc_nav::{search, Pathfinder, StationGrid};

fn serpentine_grid(size: u32) -> StationGrid {
    let mut grid = StationGrid::new(size, size);
    let n = size as i32;
    // Horizontal walls with alternating gaps.
    for y in (4..n - 1).step_by(4) {
        let gap = if (y / 4) % 2 == 0 { n - 2 } else { 1 };
        for x in 0..n {
            if x != gap {
                grid.set_wall(Coord::new(x, y), true);
            }
        }
    }
    grid
}

fn bench_pathfinder(c: &mut Criterion) {
    let grid = serpentine_grid(64);
    let start = Coord::new(0, 0);
    let goal = Coord::new(63, 63);

    let mut group = c.benchmark_group("npc-nav/pathfinder");

    group.bench_function("search_cold", |b| {
        b.iter(|| {
            let tiles = search(&grid, start, goal).expect("path");
            black_box(tiles.len());
        })
    });

    let mut pathfinder = Pathfinder::new();
    pathfinder.find_path(start, goal, &grid, 0);
    group.bench_function("find_path_cached", |b| {
        b.iter(|| {
            let result = pathfinder.find_path(start, goal, &grid, 0);
            black_box(result.is_found());
        })
    });

    let mut tick = 0u64;
    let mut fresh = Pathfinder::new();
    group.bench_function("find_path_new_tick", |b| {
        b.iter(|| {
            tick += 1;
            let delta = fresh.move_delta(start, goal, &grid, tick);
            black_box(delta);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pathfinder);
criterion_main!(benches);
