//! Applies dispatched perception events to actor state.

use npc_core::{ActorId, Coord, EventChannel, StationView};
use npc_nav::Pathfinder;

use crate::actor::{Actor, Coordination, Investigation, Roster, SuspicionState};
use crate::cascade::{set_state, start_search};
use crate::config::AiConfig;
use crate::coordination;
use crate::event::{AiEvent, EventSource, Outcome, PerceptionEvent};
use crate::{investigation, suspicion};

pub(crate) struct ReactionEnv<'a, W: ?Sized> {
    pub world: &'a W,
    pub pathfinder: &'a mut Pathfinder,
    pub channel: &'a EventChannel<AiEvent>,
    pub config: &'a AiConfig,
    pub tick: u64,
}

pub(crate) fn apply<W: StationView + ?Sized>(
    event: &AiEvent,
    roster: &mut Roster,
    env: &mut ReactionEnv<'_, W>,
) {
    let AiEvent::Perception(perception) = event else {
        return;
    };
    if perception.source.is_noise() {
        hear(perception, roster, env);
    } else {
        observed(perception, roster, env);
    }
}

/// Investigation window: base turns plus time to walk there and loiter.
fn investigation_for(
    goal: Coord,
    from: Coord,
    priority: u8,
    linger: u8,
    config: &AiConfig,
    tick: u64,
) -> Investigation {
    let travel = from.chebyshev(goal) as u64;
    Investigation {
        goal,
        priority,
        expires_at: tick
            .saturating_add(config.investigation.turns)
            .saturating_add(travel)
            .saturating_add(linger as u64),
        linger,
        arrived: false,
    }
}

fn hear<W: StationView + ?Sized>(
    perception: &PerceptionEvent,
    roster: &mut Roster,
    env: &mut ReactionEnv<'_, W>,
) {
    let Some(at) = perception.target else {
        return;
    };
    let range = perception.noise as u32 + env.config.investigation.hearing_margin;

    for actor in roster.values_mut() {
        if !actor.is_ai_controlled() || actor.revealed || Some(actor.id) == perception.subject {
            continue;
        }
        if actor.pos.manhattan(at) > range {
            continue;
        }
        if !investigation::should_replace(actor.investigation.as_ref(), perception.priority) {
            continue;
        }
        tracing::debug!(
            actor = %actor.id,
            at = %at,
            source = ?perception.source,
            "investigating noise"
        );
        actor.investigation = Some(investigation_for(
            at,
            actor.pos,
            perception.priority,
            perception.linger,
            env.config,
            env.tick,
        ));
    }
}

fn observed<W: StationView + ?Sized>(
    perception: &PerceptionEvent,
    roster: &mut Roster,
    env: &mut ReactionEnv<'_, W>,
) {
    let Some(observer_id) = perception.observer else {
        return;
    };
    let subject_pos = perception
        .subject
        .and_then(|id| roster.get(&id))
        .map(|a| a.pos);
    let Some(observer) = roster.get_mut(&observer_id) else {
        return;
    };
    if !observer.is_ai_controlled() {
        return;
    }

    let tick = env.tick;
    suspicion::raise(
        &mut observer.suspicion,
        perception.suspicion_delta,
        tick,
        &env.config.suspicion,
    );
    if subject_pos.is_some() {
        observer.last_known = subject_pos;
    }

    match perception.outcome {
        Outcome::Detected => {
            observer.in_contact = true;
            if let Some(at) = subject_pos.filter(|_| observer.search.is_some()) {
                start_search(observer, at, env.world, env.channel, env.config, tick);
            }
        }
        Outcome::Evaded => {
            let close_call = &env.config.investigation;
            if let Some(at) = subject_pos {
                if perception.suspicion_delta > 0
                    && investigation::should_replace(
                        observer.investigation.as_ref(),
                        close_call.close_call_priority,
                    )
                {
                    observer.investigation = Some(investigation_for(
                        at,
                        observer.pos,
                        close_call.close_call_priority,
                        close_call.close_call_linger,
                        env.config,
                        tick,
                    ));
                }
            }
        }
    }

    let springs_ambush = perception.is_detection()
        && perception.source == EventSource::Observer
        && observer.can_coordinate()
        && observer.coordination.is_none();
    if springs_ambush {
        if let Some(target) = subject_pos {
            broadcast_coordination(observer_id, target, roster, env);
        }
    }
}

fn broadcast_coordination<W: StationView + ?Sized>(
    leader_id: ActorId,
    target: Coord,
    roster: &mut Roster,
    env: &mut ReactionEnv<'_, W>,
) {
    let Some(leader) = roster.get(&leader_id) else {
        return;
    };
    let leader_pos = leader.pos;
    let leader_room = env.world.room_name_of(leader_pos);
    let mut nearby = env.world.connections(&leader_room);
    nearby.push(leader_room);

    let allies: Vec<(ActorId, Coord)> = roster
        .values()
        .filter(|a| {
            a.id != leader_id
                && a.is_ai_controlled()
                && a.can_coordinate()
                && a.coordination.is_none()
                && nearby.contains(&env.world.room_name_of(a.pos))
        })
        .map(|a| (a.id, a.pos))
        .collect();
    if allies.is_empty() {
        return;
    }

    let (config, channel, tick) = (&env.config.coordination, env.channel, env.tick);
    let plan = coordination::plan_flanks(
        env.world,
        env.pathfinder,
        tick,
        leader_pos,
        target,
        &allies,
        &config.flank_distances,
    );

    let assign = |actor: &mut Actor, flank: Option<Coord>| {
        actor.coordination = Some(Coordination {
            target,
            flank,
            leader: leader_id,
            turns_remaining: config.turns,
        });
        set_state(actor, SuspicionState::Coordinating, channel, tick);
    };
    if let Some(leader) = roster.get_mut(&leader_id) {
        assign(leader, None);
    }
    for assignment in &plan {
        if let Some(ally) = roster.get_mut(&assignment.ally) {
            assign(ally, assignment.flank);
        }
    }

    let ally_ids: Vec<ActorId> = plan.iter().map(|a| a.ally).collect();
    tracing::info!(
        leader = %leader_id,
        allies = ally_ids.len(),
        target = %target,
        tick,
        "ambush coordinated"
    );
    channel.publish(AiEvent::CoordinationFormed {
        leader: leader_id,
        allies: ally_ids,
        target,
        tick,
    });
}

/// Outcome of the quarry trying to talk an observer down.
pub(crate) fn explain_away(
    observer: &mut Actor,
    quarry_pos: Option<Coord>,
    success: bool,
    config: &AiConfig,
    tick: u64,
) {
    if success {
        suspicion::lower(&mut observer.suspicion, 4);
        observer.in_contact = false;
        observer.investigation = None;
        observer.last_known = None;
        return;
    }

    suspicion::raise(&mut observer.suspicion, 5, tick, &config.suspicion);
    observer.in_contact = true;
    observer.last_known = quarry_pos;
    if let Some(at) = quarry_pos {
        let priority = config.investigation.close_call_priority;
        observer.investigation = Some(investigation_for(
            at,
            observer.pos,
            priority,
            config.investigation.close_call_linger,
            config,
            tick,
        ));
    }
}
