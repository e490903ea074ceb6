//! Suspicion level bookkeeping and state derivation.

use crate::actor::{Suspicion, SuspicionState};
use crate::config::SuspicionConfig;

fn rank(state: SuspicionState) -> u8 {
    match state {
        SuspicionState::Idle => 0,
        SuspicionState::Question => 1,
        SuspicionState::Follow => 2,
        SuspicionState::Coordinating => 3,
    }
}

fn from_rank(rank: u8) -> SuspicionState {
    match rank {
        0 => SuspicionState::Idle,
        1 => SuspicionState::Question,
        _ => SuspicionState::Follow,
    }
}

/// State implied by a level alone.
pub fn target_state(level: u8, config: &SuspicionConfig) -> SuspicionState {
    if level >= config.follow_threshold {
        SuspicionState::Follow
    } else if level >= config.question_threshold {
        SuspicionState::Question
    } else {
        SuspicionState::Idle
    }
}

/// Adds `delta`, clamped to `config.max`. Any positive delta postpones decay.
pub fn raise(suspicion: &mut Suspicion, delta: u8, tick: u64, config: &SuspicionConfig) {
    if delta == 0 {
        return;
    }
    suspicion.level = suspicion.level.saturating_add(delta).min(config.max);
    suspicion.last_raised = Some(tick);
}

/// Subtracts `amount`, never below zero.
pub fn lower(suspicion: &mut Suspicion, amount: u8) {
    suspicion.level = suspicion.level.saturating_sub(amount);
}

/// Per-tick derivation: decay, then move the state toward what the level implies.
///
/// Upward moves advance one rung per tick so `Idle -> Follow` always passes through `Question`.
/// Downward moves land directly. `Coordinating` is owned by the ambush logic and never changes
/// here. Returns the next record and `(from, to)` when the state changed.
pub fn derive(
    current: &Suspicion,
    tick: u64,
    config: &SuspicionConfig,
) -> (Suspicion, Option<(SuspicionState, SuspicionState)>) {
    let mut next = current.clone();
    next.level = next.level.min(config.max);

    let quiet_for = next
        .last_raised
        .map_or(u64::MAX, |raised| tick.saturating_sub(raised));
    if next.level > 0 && quiet_for >= config.decay_delay {
        lower(&mut next, config.decay_amount);
    }

    if current.state == SuspicionState::Coordinating {
        return (next, None);
    }

    let have = rank(current.state);
    let want = rank(target_state(next.level, config));
    next.state = if want > have {
        from_rank(have + 1)
    } else {
        from_rank(want)
    };

    if next.state == SuspicionState::Idle {
        next.confronted = false;
    }

    let (from, to) = (current.state, next.state);
    if from == to {
        (next, None)
    } else {
        (next, Some((from, to)))
    }
}
