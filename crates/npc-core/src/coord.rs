use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Exact path cost on an open 8-connected grid (orthogonal 1, diagonal √2).
    pub fn octile(self, other: Coord) -> f64 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        (hi - lo) as f64 + lo as f64 * core::f64::consts::SQRT_2
    }

    /// Single-tile greedy step toward `target`: each axis moves by its sign.
    pub fn step_toward(self, target: Coord) -> (i32, i32) {
        ((target.x - self.x).signum(), (target.y - self.y).signum())
    }

    pub fn delta_to(self, other: Coord) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
