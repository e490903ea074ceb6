use npc_core::{Coord, GridView};
use npc_nav::{path_cost, search, PathResult, Pathfinder, StationGrid};

fn walled_grid() -> StationGrid {
    // Vertical wall at x = 5 with a single gap at y = 7.
    let mut grid = StationGrid::new(10, 10);
    for y in 0..10 {
        if y != 7 {
            grid.set_wall(Coord::new(5, y), true);
        }
    }
    grid
}

#[test]
fn open_grid_paths_cost_exactly_the_octile_distance() {
    let grid = StationGrid::new(16, 16);
    let start = Coord::new(1, 2);
    for goal in [
        Coord::new(1, 2),
        Coord::new(9, 2),
        Coord::new(9, 9),
        Coord::new(15, 4),
        Coord::new(0, 15),
    ] {
        let tiles = search(&grid, start, goal).expect("open grid is fully reachable");
        assert_eq!(tiles.first(), Some(&start));
        assert_eq!(tiles.last(), Some(&goal));
        let cost = path_cost(&tiles);
        assert!(
            (cost - start.octile(goal)).abs() < 1e-9,
            "cost {cost} for {goal:?}"
        );
    }
}

#[test]
fn path_routes_through_wall_gap() {
    let grid = walled_grid();
    let tiles = search(&grid, Coord::new(1, 1), Coord::new(8, 1)).expect("gap is open");

    assert!(tiles.contains(&Coord::new(5, 7)));
    for pair in tiles.windows(2) {
        assert!(pair[0].chebyshev(pair[1]) == 1);
        assert!(grid.is_walkable(pair[1]));
    }
}

#[test]
fn unreachable_goal_is_no_path() {
    let mut grid = walled_grid();
    grid.set_wall(Coord::new(5, 7), true);

    let mut pathfinder = Pathfinder::new();
    let result = pathfinder.find_path(Coord::new(1, 1), Coord::new(8, 1), &grid, 1);
    assert_eq!(result, PathResult::NoPath);
    assert_eq!(result.next_step(), None);

    assert!(search(&grid, Coord::new(1, 1), Coord::new(5, 0)).is_none());
    assert!(search(&grid, Coord::new(1, 1), Coord::new(-1, 0)).is_none());
}

#[test]
fn search_is_deterministic_for_same_input() {
    let grid = walled_grid();
    let a = search(&grid, Coord::new(0, 0), Coord::new(9, 9));
    let b = search(&grid, Coord::new(0, 0), Coord::new(9, 9));
    assert!(a.is_some());
    assert_eq!(a, b);
}

#[test]
fn same_tick_queries_are_served_from_cache() {
    let grid = walled_grid();
    let mut pathfinder = Pathfinder::new();
    let (start, goal) = (Coord::new(1, 1), Coord::new(8, 8));

    assert!(!pathfinder.is_cached(start, goal, 4));
    let first = pathfinder.find_path(start, goal, &grid, 4);
    assert!(pathfinder.is_cached(start, goal, 4));
    let second = pathfinder.find_path(start, goal, &grid, 4);

    assert_eq!(first, second);
    assert_eq!(pathfinder.stats().misses, 1);
    assert_eq!(pathfinder.stats().hits, 1);
}

#[test]
fn tick_boundary_invalidates_cache_and_sees_new_barricade() {
    let mut grid = StationGrid::outpost();
    let mut pathfinder = Pathfinder::new();
    let start = Coord::new(7, 7);
    let goal = Coord::new(12, 12);

    let before = pathfinder.find_path(start, goal, &grid, 1);
    assert!(before.is_found());

    grid.barricade("Lab");

    // Same tick: the stale entry is still served.
    assert_eq!(pathfinder.find_path(start, goal, &grid, 1), before);

    let after = pathfinder.find_path(start, goal, &grid, 2);
    assert_eq!(after, PathResult::NoPath);
    assert_eq!(pathfinder.epoch(), Some(2));
    assert!(!pathfinder.is_cached(start, goal, 1));
}

#[test]
fn repeated_unreachable_queries_share_cached_no_path_and_zero_delta() {
    let mut grid = StationGrid::new(8, 8);
    for y in 0..8 {
        grid.set_wall(Coord::new(4, y), true);
    }
    let mut pathfinder = Pathfinder::new();
    let (start, goal) = (Coord::new(1, 3), Coord::new(6, 3));

    let a = pathfinder.move_delta(start, goal, &grid, 9);
    let b = pathfinder.move_delta(start, goal, &grid, 9);

    assert_eq!(a, (0, 0));
    assert_eq!(a, b);
    assert_eq!(pathfinder.stats().misses, 1);
    assert_eq!(pathfinder.stats().hits, 1);
    assert_eq!(pathfinder.cached_len(), 1);
}

#[test]
fn move_delta_points_at_next_hop() {
    let grid = StationGrid::new(5, 5);
    let mut pathfinder = Pathfinder::new();

    assert_eq!(
        pathfinder.move_delta(Coord::new(0, 0), Coord::new(3, 3), &grid, 0),
        (1, 1)
    );
    assert_eq!(
        pathfinder.move_delta(Coord::new(2, 2), Coord::new(2, 2), &grid, 0),
        (0, 0)
    );
}
