//! The movement primitive shared by every branch that moves.
//!
//! Price the path query (cache hit vs fresh search) against the tick budget; on a grant follow
//! the A* next hop, otherwise step greedily. Barricaded rooms stop everyone except revealed
//! hunters, who may try to break through. Stepping onto a deployed trap springs it.

use npc_core::{Coord, DeterministicRng, StationMut};

use crate::actor::Actor;
use crate::cascade::TickEnv;
use crate::event::{AiEvent, EventSource, PerceptionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Moved,
    /// Already standing on the goal.
    Arrived,
    Blocked,
    BreachFailed,
}

pub(crate) fn travel_toward<W: StationMut + ?Sized>(
    actor: &mut Actor,
    goal: Coord,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> MoveOutcome {
    if actor.pos == goal {
        return MoveOutcome::Arrived;
    }

    let tick = env.clock.tick;
    let costs = env.config.budget.costs;
    let cost = if env.pathfinder.is_cached(actor.pos, goal, tick) {
        costs.cached_path
    } else {
        costs.fresh_path
    };

    let planned = if env.budget.request(cost).is_granted() {
        env.pathfinder.next_step(actor.pos, goal, &*env.world, tick)
    } else {
        None
    };
    let next = planned.unwrap_or_else(|| {
        let (dx, dy) = actor.pos.step_toward(goal);
        actor.pos.offset(dx, dy)
    });
    step_to(actor, next, env, rng)
}

/// Travel, then maybe once more when the alert speeds this actor up.
pub(crate) fn pursue<W: StationMut + ?Sized>(
    actor: &mut Actor,
    goal: Coord,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> MoveOutcome {
    let first = travel_toward(actor, goal, env, rng);
    if first == MoveOutcome::Moved && actor.alert_aware && actor.pos != goal {
        let extra = env.modifiers.speed_multiplier - 1.0;
        if rng.chance(extra) {
            travel_toward(actor, goal, env, rng);
        }
    }
    first
}

/// Commit a single-tile move to `next`.
pub(crate) fn step_to<W: StationMut + ?Sized>(
    actor: &mut Actor,
    next: Coord,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> MoveOutcome {
    let from = actor.pos;
    if next == from {
        return MoveOutcome::Arrived;
    }
    if !env.world.in_bounds(next) {
        return MoveOutcome::Blocked;
    }

    let here = env.world.room_name_of(from);
    let there = env.world.room_name_of(next);
    let entering = here != there;

    if entering && env.world.is_access_blocked(&there) {
        if !actor.revealed {
            return MoveOutcome::Blocked;
        }
        let attempt = env.world.attempt_break_block(&there, actor.id, rng);
        tracing::debug!(
            actor = %actor.id,
            room = %there,
            success = attempt.success,
            "barricade attempt"
        );
        env.channel.publish(AiEvent::BarricadeAttempt {
            actor: actor.id,
            room: there.clone(),
            success: attempt.success,
            message: attempt.message,
        });
        if !attempt.success {
            return MoveOutcome::BreachFailed;
        }
    }

    // Tiles of a barricaded room stay passable for whoever is already inside.
    let inside_blocked_room = !entering && env.world.is_access_blocked(&there);
    if !inside_blocked_room && !env.world.is_walkable(next) {
        return MoveOutcome::Blocked;
    }

    actor.pos = next;

    if let Some(trap) = env.traps.trigger(next) {
        let tick = env.clock.tick;
        let investigation = &env.config.investigation;
        tracing::info!(actor = %actor.id, trap = %trap.name, at = %next, "trap sprung");
        env.channel.publish(AiEvent::TrapSprung {
            actor: actor.id,
            at: next,
            trap: trap.name.clone(),
            tick,
        });
        env.channel.publish(AiEvent::Perception(
            PerceptionEvent::noise(
                EventSource::Trap,
                next,
                there,
                trap.noise,
                investigation.trap_priority,
                investigation.trap_linger,
            )
            .with_subject(actor.id),
        ));
    }

    MoveOutcome::Moved
}
