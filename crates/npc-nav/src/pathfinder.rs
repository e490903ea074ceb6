use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use npc_core::{Coord, GridView};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-point step costs so open-set ordering stays total.
const ORTHOGONAL_COST: u64 = 10_000;
const DIAGONAL_COST: u64 = 14_142;

// Fixed order for determinism.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    /// Ordered tiles from start to goal, both inclusive.
    Found(Vec<Coord>),
    NoPath,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn tiles(&self) -> Option<&[Coord]> {
        match self {
            Self::Found(tiles) => Some(tiles),
            Self::NoPath => None,
        }
    }

    /// The hop after the start tile, if the path has one.
    pub fn next_step(&self) -> Option<Coord> {
        self.tiles().and_then(|tiles| tiles.get(1).copied())
    }
}

/// Cumulative lookup counters; never reset by a tick boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct OpenNode {
    f: u64,
    g: u64,
    tie: u64,
    at: Coord,
}

impl OpenNode {
    fn key(&self) -> (u64, u64, u64) {
        (self.f, self.g, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

fn heuristic(a: Coord, b: Coord) -> u64 {
    let dx = a.x.abs_diff(b.x) as u64;
    let dy = a.y.abs_diff(b.y) as u64;
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    (hi - lo) * ORTHOGONAL_COST + lo * DIAGONAL_COST
}

fn reconstruct_path(came_from: &HashMap<Coord, Coord>, mut current: Coord) -> Vec<Coord> {
    let mut out = vec![current];
    while let Some(prev) = came_from.get(&current) {
        current = *prev;
        out.push(current);
    }
    out.reverse();
    out
}

/// Stateless A* search over an 8-connected grid.
///
/// The start tile only needs to be in bounds (an actor may be standing somewhere that has since
/// become blocked); the goal must be walkable.
pub fn search<G: GridView + ?Sized>(grid: &G, start: Coord, goal: Coord) -> Option<Vec<Coord>> {
    if !grid.in_bounds(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open = BinaryHeap::<OpenNode>::new();
    let mut tie: u64 = 0;
    let mut g_score: HashMap<Coord, u64> = HashMap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();

    g_score.insert(start, 0);
    open.push(OpenNode {
        f: heuristic(start, goal),
        g: 0,
        tie,
        at: start,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        if node.at == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        if g_score.get(&node.at).is_some_and(|best| node.g != *best) {
            // Stale heap entry.
            continue;
        }

        for (dx, dy) in NEIGHBORS {
            let next = node.at.offset(dx, dy);
            if !grid.is_walkable(next) {
                continue;
            }

            let step = if dx != 0 && dy != 0 {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            };
            let tentative_g = node.g.saturating_add(step);
            if g_score.get(&next).is_some_and(|g| tentative_g >= *g) {
                continue;
            }

            came_from.insert(next, node.at);
            g_score.insert(next, tentative_g);
            open.push(OpenNode {
                f: tentative_g.saturating_add(heuristic(next, goal)),
                g: tentative_g,
                tie,
                at: next,
            });
            tie += 1;
        }
    }

    None
}

/// Movement cost of a tile sequence (orthogonal 1, diagonal √2).
pub fn path_cost(tiles: &[Coord]) -> f64 {
    tiles
        .windows(2)
        .map(|pair| {
            let (dx, dy) = pair[0].delta_to(pair[1]);
            if dx != 0 && dy != 0 {
                core::f64::consts::SQRT_2
            } else {
                1.0
            }
        })
        .sum()
}

/// A* front-end with a cache that lives for exactly one tick.
///
/// Both found paths and "no path" outcomes are memoized by exact `(start, goal)`. Any query
/// carrying a different tick than the current epoch clears the cache first, since barricades and
/// other obstacles may have changed between ticks.
#[derive(Debug, Default)]
pub struct Pathfinder {
    epoch: Option<u64>,
    cache: HashMap<(Coord, Coord), PathResult>,
    stats: CacheStats,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self, tick: u64) {
        if self.epoch != Some(tick) {
            self.cache.clear();
            self.epoch = Some(tick);
        }
    }

    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Whether a query would be served from the cache during `tick`.
    pub fn is_cached(&self, start: Coord, goal: Coord, tick: u64) -> bool {
        self.epoch == Some(tick) && self.cache.contains_key(&(start, goal))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn find_path<G: GridView + ?Sized>(
        &mut self,
        start: Coord,
        goal: Coord,
        grid: &G,
        tick: u64,
    ) -> PathResult {
        self.begin_tick(tick);

        if let Some(hit) = self.cache.get(&(start, goal)) {
            self.stats.hits += 1;
            return hit.clone();
        }

        self.stats.misses += 1;
        let result = match search(grid, start, goal) {
            Some(tiles) => PathResult::Found(tiles),
            None => PathResult::NoPath,
        };
        self.cache.insert((start, goal), result.clone());
        result
    }

    pub fn next_step<G: GridView + ?Sized>(
        &mut self,
        start: Coord,
        goal: Coord,
        grid: &G,
        tick: u64,
    ) -> Option<Coord> {
        if start == goal {
            return None;
        }
        self.find_path(start, goal, grid, tick).next_step()
    }

    /// `(dx, dy)` of the next hop, or `(0, 0)` when there is none.
    pub fn move_delta<G: GridView + ?Sized>(
        &mut self,
        start: Coord,
        goal: Coord,
        grid: &G,
        tick: u64,
    ) -> (i32, i32) {
        self.next_step(start, goal, grid, tick)
            .map(|next| start.delta_to(next))
            .unwrap_or((0, 0))
    }
}
