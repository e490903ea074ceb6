//! Pincer ambushes by hidden infected actors.
//!
//! The leader (the detecting observer) walks straight at the quarry. Each ally gets a flank tile
//! computed from the leader→quarry vector: first the lane beyond the quarry, opposite the leader,
//! then the two perpendicular lanes, each at every configured distance. A flank has to be
//! reachable by that ally, not just open.

use std::collections::BTreeSet;

use npc_core::{ActorId, Coord, GridView};
use npc_nav::Pathfinder;

use crate::actor::Coordination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlankAssignment {
    pub ally: ActorId,
    /// `None` means converge directly on the quarry.
    pub flank: Option<Coord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationAction {
    MoveTo(Coord),
    /// Reached the quarry; the ambush springs.
    Engage,
    Expired,
}

const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Candidate flank tiles in priority order.
pub fn flank_candidates(leader: Coord, quarry: Coord, distances: &[i32]) -> Vec<Coord> {
    let (mut dx, dy) = leader.step_toward(quarry);
    if (dx, dy) == (0, 0) {
        dx = 1;
    }
    let lanes = [(dx, dy), (-dy, dx), (dy, -dx)];

    let mut out = Vec::with_capacity(lanes.len() * distances.len());
    for (lx, ly) in lanes {
        for d in distances {
            let at = quarry.offset(lx * d, ly * d);
            if !out.contains(&at) {
                out.push(at);
            }
        }
    }
    out
}

/// Assigns flanks 1:1 in ally order. Allies left without a reachable candidate approach directly.
pub fn plan_flanks<G: GridView + ?Sized>(
    grid: &G,
    pathfinder: &mut Pathfinder,
    tick: u64,
    leader: Coord,
    quarry: Coord,
    allies: &[(ActorId, Coord)],
    distances: &[i32],
) -> Vec<FlankAssignment> {
    let candidates = flank_candidates(leader, quarry, distances);
    let mut claimed = BTreeSet::from([quarry, leader]);
    let mut out = Vec::with_capacity(allies.len());

    for (ally, from) in allies {
        let mut reachable = |at: Coord, claimed: &BTreeSet<Coord>| {
            !claimed.contains(&at)
                && grid.is_walkable(at)
                && pathfinder.find_path(*from, at, grid, tick).is_found()
        };

        let mut flank = None;
        for candidate in &candidates {
            if claimed.contains(candidate) {
                continue;
            }
            let resolved = if reachable(*candidate, &claimed) {
                Some(*candidate)
            } else {
                CARDINALS
                    .iter()
                    .map(|(dx, dy)| candidate.offset(*dx, *dy))
                    .find(|at| reachable(*at, &claimed))
            };
            if let Some(at) = resolved {
                claimed.insert(*candidate);
                claimed.insert(at);
                flank = Some(at);
                break;
            }
        }
        out.push(FlankAssignment { ally: *ally, flank });
    }
    out
}

/// One tick of a participant's ambush. The shared countdown is advanced by [`countdown`], not here.
pub fn step<G: GridView + ?Sized>(
    coordination: &Coordination,
    pos: Coord,
    quarry: Option<Coord>,
    grid: &G,
    retarget_distance: u32,
) -> (Option<Coordination>, CoordinationAction) {
    if coordination.turns_remaining == 0 {
        return (None, CoordinationAction::Expired);
    }

    let mut next = coordination.clone();

    if let Some(quarry) = quarry {
        if quarry.manhattan(next.target) > retarget_distance {
            let (dx, dy) = next.target.delta_to(quarry);
            next.flank = next
                .flank
                .map(|f| f.offset(dx, dy))
                .filter(|f| grid.is_walkable(*f));
            next.target = quarry;
        }
        if pos == quarry {
            return (None, CoordinationAction::Engage);
        }
    }

    if let Some(flank) = next.flank {
        if pos != flank {
            return (Some(next), CoordinationAction::MoveTo(flank));
        }
        next.flank = None;
    }
    let target = quarry.unwrap_or(next.target);
    (Some(next), CoordinationAction::MoveTo(target))
}

/// Advances every participant's countdown once per tick, so a whole ambush expires together no
/// matter which participant acts first.
pub fn countdown<'a>(coordinations: impl IntoIterator<Item = &'a mut Coordination>) {
    for c in coordinations {
        c.turns_remaining = c.turns_remaining.saturating_sub(1);
    }
}
