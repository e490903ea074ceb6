//! Revealed hunters: direct pursuit of the nearest prey.

use npc_core::{ActorId, Coord, DeterministicRng};

use crate::config::HunterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunterAction {
    Attack(ActorId),
    /// Wait in cover for prey that is close but not adjacent. Forfeits the tick.
    HoldAmbush,
    Pursue { prey: ActorId, at: Coord },
    /// No prey left.
    Prowl,
}

/// Nearest prey by Manhattan distance; ties go to the lower id.
pub fn nearest_prey(pos: Coord, prey: &[(ActorId, Coord)]) -> Option<(ActorId, Coord)> {
    prey.iter()
        .copied()
        .min_by_key(|(id, at)| (pos.manhattan(*at), *id))
}

pub fn decide(
    pos: Coord,
    prey: &[(ActorId, Coord)],
    in_cover: bool,
    config: &HunterConfig,
    rng: &mut dyn DeterministicRng,
) -> HunterAction {
    let Some((target, at)) = nearest_prey(pos, prey) else {
        return HunterAction::Prowl;
    };

    let distance = pos.manhattan(at);
    if distance == 0 {
        return HunterAction::Attack(target);
    }

    let near = (config.hold_min_distance..=config.hold_max_distance).contains(&distance);
    if in_cover && near && rng.chance(config.hold_chance) {
        return HunterAction::HoldAmbush;
    }
    HunterAction::Pursue { prey: target, at }
}
