use std::collections::BTreeMap;

use npc_core::{ActorId, Coord};
use serde::{Deserialize, Serialize};

/// A one-shot device waiting on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub name: String,
    /// Loudness when sprung; drives hearing range.
    pub noise: u8,
    #[serde(default)]
    pub owner: Option<ActorId>,
}

impl Trap {
    pub fn new(name: impl Into<String>, noise: u8) -> Self {
        Self {
            name: name.into(),
            noise,
            owner: None,
        }
    }
}

/// Deployed traps by tile. At most one per tile; triggering consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapRegistry {
    traps: BTreeMap<Coord, Trap>,
}

impl TrapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `trap`, returning any trap it displaced.
    pub fn deploy(&mut self, at: Coord, trap: Trap) -> Option<Trap> {
        self.traps.insert(at, trap)
    }

    pub fn get(&self, at: Coord) -> Option<&Trap> {
        self.traps.get(&at)
    }

    /// Removes and returns the trap at `at`.
    pub fn trigger(&mut self, at: Coord) -> Option<Trap> {
        self.traps.remove(&at)
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coord, &Trap)> {
        self.traps.iter()
    }
}
