//! Fixed-priority decision cascade, evaluated once per actor per tick. First match wins.

use npc_core::rng::streams;
use npc_core::{
    ActorId, DeterministicRng, EventChannel, GridView, StationMut, StationView, TickContext,
};
use npc_nav::Pathfinder;

use crate::actor::{Actor, Roster, SuspicionState};
use crate::alert::AlertModifiers;
use crate::budget::ActionBudget;
use crate::config::AiConfig;
use crate::coordination::{self, CoordinationAction};
use crate::event::{AiEvent, EventSource, Outcome, PerceptionEvent};
use crate::hunter::{self, HunterAction};
use crate::investigation::{self, InvestigationAction};
use crate::movement::{self, MoveOutcome};
use crate::perception::{Perception, PerceptionContext};
use crate::scheduler::Decision;
use crate::search::{self, SearchAction};
use crate::{schedule, suspicion};

/// Everything one tick of decisions shares.
pub(crate) struct TickEnv<'a, W: ?Sized> {
    pub world: &'a mut W,
    pub pathfinder: &'a mut Pathfinder,
    pub budget: &'a mut ActionBudget,
    pub traps: &'a mut crate::traps::TrapRegistry,
    pub channel: &'a EventChannel<AiEvent>,
    pub config: &'a AiConfig,
    pub clock: TickContext,
    pub modifiers: AlertModifiers,
    pub quarry: Option<ActorId>,
    pub hunt_target: Option<ActorId>,
}

/// Clamp or drop persisted sub-states that no longer make sense.
pub(crate) fn sanitize<W: GridView + ?Sized>(actor: &mut Actor, world: &W, config: &AiConfig) {
    actor.suspicion.level = actor.suspicion.level.min(config.suspicion.max);

    if actor.revealed {
        actor.coordination = None;
    }
    if let Some(c) = &mut actor.coordination {
        if !world.in_bounds(c.target) {
            actor.coordination = None;
        } else if c.flank.is_some_and(|f| !world.in_bounds(f)) {
            c.flank = None;
        }
    }
    if actor.coordination.is_none() && actor.suspicion.state == SuspicionState::Coordinating {
        actor.suspicion.state = SuspicionState::Idle;
    }

    let search_corrupt = actor.search.as_ref().is_some_and(|s| {
        !world.in_bounds(s.anchor)
            || s.targets.iter().any(|t| !world.in_bounds(*t))
            || s.current.is_some_and(|c| !world.in_bounds(c))
    });
    if search_corrupt {
        actor.search = None;
    }
    if actor
        .investigation
        .as_ref()
        .is_some_and(|inv| !world.in_bounds(inv.goal))
    {
        actor.investigation = None;
    }
    if actor.last_known.is_some_and(|at| !world.in_bounds(at)) {
        actor.last_known = None;
    }
}

pub(crate) fn set_state(
    actor: &mut Actor,
    to: SuspicionState,
    channel: &EventChannel<AiEvent>,
    tick: u64,
) {
    let from = actor.suspicion.state;
    if from == to {
        return;
    }
    actor.suspicion.state = to;
    if to == SuspicionState::Idle {
        actor.suspicion.confronted = false;
    }
    channel.publish(AiEvent::SuspicionChanged {
        actor: actor.id,
        from,
        to,
        tick,
    });
}

pub(crate) fn start_search<W: StationView + ?Sized>(
    actor: &mut Actor,
    anchor: npc_core::Coord,
    world: &W,
    channel: &EventChannel<AiEvent>,
    config: &AiConfig,
    tick: u64,
) {
    let state = search::begin(world, anchor, config.search.spiral_radius, config.search.turns);
    tracing::debug!(
        actor = %actor.id,
        anchor = %anchor,
        targets = state.targets.len(),
        "search started"
    );
    channel.publish(AiEvent::SearchStarted {
        actor: actor.id,
        anchor,
        targets: state.targets.len(),
        tick,
    });
    actor.search = Some(state);
}

fn quarry<'r, W: ?Sized>(env: &TickEnv<'_, W>, others: &'r Roster) -> Option<&'r Actor> {
    env.quarry
        .and_then(|id| others.get(&id))
        .filter(|q| q.alive)
}

pub(crate) fn run<W, P>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    perception: Option<&mut P>,
) -> Decision
where
    W: StationMut + ?Sized,
    P: Perception + ?Sized,
{
    let tick = env.clock.tick;
    let mut rng = env.clock.rng_for_actor(actor.id, streams::DECISION);

    sanitize(actor, &*env.world, env.config);
    if actor
        .investigation
        .as_ref()
        .is_some_and(|inv| investigation::is_expired(inv, tick))
    {
        actor.investigation = None;
    }

    let (next, change) = suspicion::derive(&actor.suspicion, tick, &env.config.suspicion);
    actor.suspicion = next;
    if let Some((from, to)) = change {
        env.channel.publish(AiEvent::SuspicionChanged {
            actor: actor.id,
            from,
            to,
            tick,
        });
    }

    if actor.revealed {
        return revealed_hunter(actor, others, env, &mut rng);
    }
    if let Some(decision) = coordinated_ambush(actor, others, env, &mut rng) {
        return decision;
    }
    if let Some(decision) = follow(actor, others, env, &mut rng) {
        return decision;
    }
    question(actor, others, env);
    if let Some(decision) = passive_perception(actor, others, env, perception, &mut rng) {
        return decision;
    }
    if let Some(decision) = investigate(actor, env, &mut rng) {
        return decision;
    }
    if let Some(decision) = group_hunt(actor, others, env, &mut rng) {
        return decision;
    }
    if let Some(decision) = sweep(actor, env, &mut rng) {
        return decision;
    }
    if let Some(decision) = routine(actor, env, &mut rng) {
        return decision;
    }
    wander(actor, env, &mut rng)
}

fn revealed_hunter<W: StationMut + ?Sized>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Decision {
    let tick = env.clock.tick;
    let prey: Vec<_> = others
        .values()
        .filter(|a| a.is_prey())
        .map(|a| (a.id, a.pos))
        .collect();
    let in_cover = env.world.is_low_visibility(actor.pos);

    match hunter::decide(actor.pos, &prey, in_cover, &env.config.hunter, rng) {
        HunterAction::Attack(target) => {
            tracing::info!(attacker = %actor.id, target = %target, tick, "hunter attacks");
            env.channel.publish(AiEvent::Attack {
                attacker: actor.id,
                target,
                tick,
            });
            Decision::Attack { target }
        }
        HunterAction::HoldAmbush => {
            env.channel.publish(AiEvent::AmbushHeld {
                actor: actor.id,
                tick,
            });
            Decision::HoldAmbush
        }
        HunterAction::Pursue { prey, at } => {
            movement::travel_toward(actor, at, env, rng);
            Decision::Hunt { prey }
        }
        HunterAction::Prowl => wander(actor, env, rng),
    }
}

fn coordinated_ambush<W: StationMut + ?Sized>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    let current = actor.coordination.clone()?;
    let tick = env.clock.tick;
    let quarry_pos = quarry(env, others).map(|q| q.pos);
    let (next, action) = coordination::step(
        &current,
        actor.pos,
        quarry_pos,
        &*env.world,
        env.config.coordination.retarget_distance,
    );
    actor.coordination = next;

    match action {
        CoordinationAction::Expired => {
            set_state(actor, SuspicionState::Idle, env.channel, tick);
            env.channel.publish(AiEvent::CoordinationEnded {
                actor: actor.id,
                tick,
            });
            None
        }
        CoordinationAction::Engage => {
            set_state(actor, SuspicionState::Idle, env.channel, tick);
            env.channel.publish(AiEvent::CoordinationEnded {
                actor: actor.id,
                tick,
            });
            let quarry = env.quarry?;
            let room = env.world.room_name_of(actor.pos);
            env.channel.publish(AiEvent::Perception(
                PerceptionEvent::observed(actor.id, quarry, Outcome::Detected, room)
                    .with_source(EventSource::Ambush)
                    .with_delta(env.config.coordination.engage_delta),
            ));
            Some(Decision::Engage { quarry })
        }
        CoordinationAction::MoveTo(goal) => {
            movement::travel_toward(actor, goal, env, rng);
            Some(Decision::Ambush)
        }
    }
}

fn follow<W: StationMut + ?Sized>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    if actor.suspicion.state != SuspicionState::Follow {
        return None;
    }
    let target = actor.last_known?;

    if actor.pos == target {
        if quarry(env, others).is_some_and(|q| q.pos == actor.pos) {
            return Some(Decision::Follow);
        }
        actor.last_known = None;
        actor.in_contact = false;
        start_search(actor, target, &*env.world, env.channel, env.config, env.clock.tick);
        return Some(Decision::LostContact);
    }

    movement::pursue(actor, target, env, rng);
    Some(Decision::Follow)
}

fn question<W: StationMut + ?Sized>(actor: &mut Actor, others: &Roster, env: &mut TickEnv<'_, W>) {
    if actor.suspicion.state != SuspicionState::Question || actor.suspicion.confronted {
        return;
    }
    let Some(quarry) = quarry(env, others) else {
        return;
    };
    if quarry.pos != actor.pos {
        return;
    }
    if env
        .budget
        .request(env.config.budget.costs.confrontation)
        .is_granted()
    {
        actor.suspicion.confronted = true;
        env.channel.publish(AiEvent::Confrontation {
            actor: actor.id,
            quarry: quarry.id,
            tick: env.clock.tick,
        });
    }
}

fn passive_perception<W, P>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    perception: Option<&mut P>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision>
where
    W: StationMut + ?Sized,
    P: Perception + ?Sized,
{
    let perception = perception?;
    let quarry = quarry(env, others)?;
    let tick = env.clock.tick;
    let here = env.world.room_name_of(actor.pos);

    if env.world.room_name_of(quarry.pos) != here {
        if !actor.in_contact {
            return None;
        }
        actor.in_contact = false;
        let anchor = actor.last_known.unwrap_or(actor.pos);
        start_search(actor, anchor, &*env.world, env.channel, env.config, tick);
        return Some(Decision::LostContact);
    }

    if !env
        .budget
        .request(env.config.budget.costs.perception)
        .is_granted()
    {
        return None;
    }

    let context = PerceptionContext {
        noise: quarry.noise,
        visibility_modifier: env.world.visibility_modifier(&here),
        alert_bonus: if actor.alert_aware {
            env.modifiers.observation_bonus
        } else {
            0
        },
    };
    let mut roll = env.clock.rng_for_actor(actor.id, streams::PERCEPTION);
    let mut event = perception.evaluate_detection(actor, quarry, &context, &mut roll);
    event.observer = Some(actor.id);
    event.subject = Some(quarry.id);
    event.room = here;
    event.target = None;
    event.source = EventSource::Observer;

    let detected = event.is_detection();
    env.channel.publish(AiEvent::Perception(event));

    if detected {
        actor.last_known = Some(quarry.pos);
        actor.in_contact = true;
        movement::pursue(actor, quarry.pos, env, rng);
        return Some(Decision::Pursue);
    }
    if actor.in_contact {
        actor.in_contact = false;
        let anchor = actor.last_known.unwrap_or(actor.pos);
        start_search(actor, anchor, &*env.world, env.channel, env.config, tick);
        return Some(Decision::LostContact);
    }
    None
}

fn investigate<W: StationMut + ?Sized>(
    actor: &mut Actor,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    let current = actor.investigation.clone()?;
    let tick = env.clock.tick;
    let (next, action) = investigation::step(&current, actor.pos, tick);
    actor.investigation = next;

    match action {
        InvestigationAction::Clear => None,
        InvestigationAction::Travel(goal) => {
            movement::pursue(actor, goal, env, rng);
            Some(Decision::Investigate)
        }
        InvestigationAction::Loiter { announce } => {
            if announce {
                env.channel.publish(AiEvent::InvestigationArrived {
                    actor: actor.id,
                    at: current.goal,
                    tick,
                });
            }
            Some(Decision::Investigate)
        }
    }
}

fn group_hunt<W: StationMut + ?Sized>(
    actor: &mut Actor,
    others: &Roster,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    let target = env
        .hunt_target
        .filter(|id| *id != actor.id)
        .and_then(|id| others.get(&id))
        .filter(|a| a.alive);
    let Some(target) = target else {
        actor.hunting = false;
        return None;
    };

    if !actor.hunting {
        actor.hunting = true;
        env.channel.publish(AiEvent::HuntJoined {
            actor: actor.id,
            target: target.id,
            tick: env.clock.tick,
        });
    }
    movement::pursue(actor, target.pos, env, rng);
    Some(Decision::GroupHunt { target: target.id })
}

fn sweep<W: StationMut + ?Sized>(
    actor: &mut Actor,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    let current = actor.search.clone()?;
    let (next, action) = search::step(&current, actor.pos, &*env.world);
    actor.search = next;

    match action {
        SearchAction::Exhausted => {
            tracing::debug!(actor = %actor.id, "search exhausted");
            env.channel.publish(AiEvent::SearchEnded {
                actor: actor.id,
                tick: env.clock.tick,
            });
            None
        }
        SearchAction::Travel(target) => {
            if movement::travel_toward(actor, target, env, rng) == MoveOutcome::Moved {
                let pos = actor.pos;
                if let Some(state) = actor.search.as_mut() {
                    search::mark_visited(state, &*env.world, pos);
                }
            }
            Some(Decision::Search)
        }
    }
}

fn routine<W: StationMut + ?Sized>(
    actor: &mut Actor,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Option<Decision> {
    let room = schedule::destination(&actor.schedule, env.clock.hour)?.to_string();
    if env.world.room_name_of(actor.pos) == room {
        return Some(Decision::Routine);
    }
    let anchor = env.world.room_anchor(&room)?;
    movement::travel_toward(actor, anchor, env, rng);
    Some(Decision::Routine)
}

fn wander<W: StationMut + ?Sized>(
    actor: &mut Actor,
    env: &mut TickEnv<'_, W>,
    rng: &mut dyn DeterministicRng,
) -> Decision {
    if !rng.chance(env.config.wander_chance) {
        return Decision::Idle;
    }
    let dx = rng.range_inclusive(-1, 1);
    let dy = rng.range_inclusive(-1, 1);
    let next = actor.pos.offset(dx, dy);
    match movement::step_to(actor, next, env, rng) {
        MoveOutcome::Moved => Decision::Wander,
        _ => Decision::Idle,
    }
}
