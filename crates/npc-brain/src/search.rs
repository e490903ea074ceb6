//! Spiral search around a last-known location.
//!
//! Targets are the eight compass points of each ring `1..=radius` (clockwise from north), then the
//! anchors of rooms connected to the anchor's room. Visited tiles and rooms are remembered so a
//! sweep never re-checks them; once everything is visited the sweep cycles back to the first
//! target instead of stalling.

use std::collections::BTreeSet;

use npc_core::{Coord, StationView};

use crate::actor::SearchState;

const COMPASS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Travel(Coord),
    Exhausted,
}

pub fn spiral_targets<W: StationView + ?Sized>(
    world: &W,
    anchor: Coord,
    radius: u8,
) -> Vec<Coord> {
    let mut seen = BTreeSet::from([anchor]);
    let mut targets = Vec::new();

    for ring in 1..=radius as i32 {
        for (dx, dy) in COMPASS {
            let at = anchor.offset(dx * ring, dy * ring);
            if world.is_walkable(at) && seen.insert(at) {
                targets.push(at);
            }
        }
    }

    let home = world.room_name_of(anchor);
    for room in world.connections(&home) {
        if let Some(at) = world.room_anchor(&room) {
            if world.is_walkable(at) && seen.insert(at) {
                targets.push(at);
            }
        }
    }
    targets
}

pub fn begin<W: StationView + ?Sized>(
    world: &W,
    anchor: Coord,
    radius: u8,
    turns: u8,
) -> SearchState {
    SearchState {
        anchor,
        radius,
        targets: spiral_targets(world, anchor, radius),
        visited_tiles: BTreeSet::from([anchor]),
        visited_rooms: BTreeSet::from([world.room_name_of(anchor)]),
        turns_remaining: turns,
        current: None,
    }
}

/// A target counts as checked once its tile was visited, or once its room was entered (rooms
/// other than the one the search started in).
pub fn is_visited<W: StationView + ?Sized>(state: &SearchState, world: &W, target: Coord) -> bool {
    if state.visited_tiles.contains(&target) {
        return true;
    }
    let room = world.room_name_of(target);
    room != world.room_name_of(state.anchor) && state.visited_rooms.contains(&room)
}

/// First unchecked target; cycles to the first target (or the anchor) when none is left.
pub fn next_target<W: StationView + ?Sized>(state: &SearchState, world: &W) -> Coord {
    state
        .targets
        .iter()
        .copied()
        .find(|t| !is_visited(state, world, *t))
        .or_else(|| state.targets.first().copied())
        .unwrap_or(state.anchor)
}

pub fn mark_visited<W: StationView + ?Sized>(state: &mut SearchState, world: &W, at: Coord) {
    state.visited_tiles.insert(at);
    state.visited_rooms.insert(world.room_name_of(at));
}

pub fn step<W: StationView + ?Sized>(
    state: &SearchState,
    pos: Coord,
    world: &W,
) -> (Option<SearchState>, SearchAction) {
    if state.turns_remaining == 0 {
        return (None, SearchAction::Exhausted);
    }

    let mut next = state.clone();
    mark_visited(&mut next, world, pos);

    let target = match next.current {
        Some(current) if current != pos && !next.visited_tiles.contains(&current) => current,
        _ => next_target(&next, world),
    };
    next.current = Some(target);
    next.turns_remaining -= 1;
    (Some(next), SearchAction::Travel(target))
}
