//! Walk to a noise source, loiter, then give up.

use npc_core::Coord;

use crate::actor::Investigation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationAction {
    Travel(Coord),
    /// At the goal; `announce` is set on the first tick there.
    Loiter { announce: bool },
    Clear,
}

pub fn is_expired(investigation: &Investigation, tick: u64) -> bool {
    tick > investigation.expires_at
}

/// Whether `incoming` may replace `current`.
pub fn should_replace(current: Option<&Investigation>, incoming_priority: u8) -> bool {
    current.map_or(true, |inv| incoming_priority >= inv.priority)
}

pub fn step(
    investigation: &Investigation,
    pos: Coord,
    tick: u64,
) -> (Option<Investigation>, InvestigationAction) {
    if is_expired(investigation, tick) {
        return (None, InvestigationAction::Clear);
    }

    if pos != investigation.goal && !investigation.arrived {
        return (
            Some(investigation.clone()),
            InvestigationAction::Travel(investigation.goal),
        );
    }

    if investigation.linger == 0 {
        let action = if investigation.arrived {
            InvestigationAction::Clear
        } else {
            InvestigationAction::Loiter { announce: true }
        };
        return (None, action);
    }

    let mut next = investigation.clone();
    let announce = !next.arrived;
    next.arrived = true;
    next.linger -= 1;
    (Some(next), InvestigationAction::Loiter { announce })
}
