//! Per-tick driver: owns the budget, path cache, alert, trap registry and event channel, and runs
//! the decision cascade for every living non-player actor in ascending id order.

use npc_core::{ActorId, Coord, EventChannel, StationMut, StationView, Subscription, TickContext};
use npc_nav::{CacheStats, Pathfinder};
use npc_tools::{tags, Diagnostic, DiagnosticSink, NullDiagnosticSink};
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Roster};
use crate::alert::{AlertCoordinator, AlertState};
use crate::budget::ActionBudget;
use crate::cascade::{self, TickEnv};
use crate::config::AiConfig;
use crate::coordination;
use crate::event::{AiEvent, AlertSignal, EventSource, PerceptionEvent};
use crate::perception::Perception;
use crate::reactions::{self, ReactionEnv};
use crate::traps::{Trap, TrapRegistry};

/// What an actor did with its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    Attack { target: ActorId },
    HoldAmbush,
    Hunt { prey: ActorId },
    Engage { quarry: ActorId },
    Ambush,
    Follow,
    LostContact,
    Pursue,
    Investigate,
    GroupHunt { target: ActorId },
    Search,
    Routine,
    Wander,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub hour: u8,
    pub decisions: Vec<(ActorId, Decision)>,
    pub budget_limit: u32,
    pub budget_spent: u32,
    pub exhaustion_count: u32,
    pub cache: CacheStats,
    pub alert: AlertState,
    pub diagnostics: Vec<Diagnostic>,
}

impl TickReport {
    pub fn decision_of(&self, actor: ActorId) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|(id, _)| *id == actor)
            .map(|(_, d)| *d)
    }
}

pub struct AiScheduler {
    config: AiConfig,
    channel: EventChannel<AiEvent>,
    reactions: Subscription<AiEvent>,
    tap: Subscription<AiEvent>,
    alert: AlertCoordinator,
    pathfinder: Pathfinder,
    budget: ActionBudget,
    traps: TrapRegistry,
    actors: Roster,
    quarry: Option<ActorId>,
    hunt_target: Option<ActorId>,
    tick: u64,
    seed: u64,
    sink: Box<dyn DiagnosticSink>,
}

impl AiScheduler {
    pub fn new(config: AiConfig, seed: u64) -> Self {
        let channel = EventChannel::new();
        let alert = AlertCoordinator::new(&channel, config.alert);
        Self {
            reactions: channel.subscribe(),
            tap: channel.subscribe(),
            alert,
            channel,
            pathfinder: Pathfinder::new(),
            budget: ActionBudget::new(0),
            traps: TrapRegistry::new(),
            actors: Roster::new(),
            quarry: None,
            hunt_target: None,
            tick: 0,
            seed,
            sink: Box::new(NullDiagnosticSink),
            config,
        }
    }

    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Handle for presentation layers; subscribe to receive every [`AiEvent`].
    pub fn channel(&self) -> &EventChannel<AiEvent> {
        &self.channel
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Adds or replaces an actor. The first player actor inserted becomes the quarry.
    pub fn insert_actor(&mut self, actor: Actor) -> Option<Actor> {
        if actor.player && self.quarry.is_none() {
            self.quarry = Some(actor.id);
        }
        self.actors.insert(actor.id, actor)
    }

    pub fn actors(&self) -> &Roster {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Actor> {
        self.actors.values().find(|a| a.name == name)
    }

    /// Marks an actor dead and drops its AI sub-states.
    pub fn mark_dead(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        actor.alive = false;
        actor.reset_ai();
        if self.hunt_target == Some(id) {
            self.hunt_target = None;
        }
        true
    }

    pub fn set_quarry(&mut self, quarry: Option<ActorId>) {
        self.quarry = quarry;
    }

    pub fn quarry(&self) -> Option<ActorId> {
        self.quarry
    }

    /// Living non-player actors converge on `target` until it dies or is cleared.
    pub fn set_hunt_target(&mut self, target: Option<ActorId>) {
        self.hunt_target = target;
    }

    pub fn hunt_target(&self) -> Option<ActorId> {
        self.hunt_target
    }

    pub fn traps(&self) -> &TrapRegistry {
        &self.traps
    }

    pub fn traps_mut(&mut self) -> &mut TrapRegistry {
        &mut self.traps
    }

    pub fn deploy_trap(&mut self, at: Coord, trap: Trap) -> Option<Trap> {
        self.traps.deploy(at, trap)
    }

    pub fn alert(&self) -> &AlertCoordinator {
        &self.alert
    }

    pub fn alert_mut(&mut self) -> &mut AlertCoordinator {
        &mut self.alert
    }

    pub fn alert_state(&self) -> &AlertState {
        self.alert.state()
    }

    pub fn restore_alert(&mut self, state: AlertState) {
        self.alert.restore(state);
    }

    pub fn budget(&self) -> &ActionBudget {
        &self.budget
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    /// Number of the last completed tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Queue an externally produced event; it is dispatched at the start of the next tick.
    pub fn publish(&self, event: AiEvent) {
        self.channel.publish(event);
    }

    /// Apply queued events now rather than at the start of the next tick.
    pub fn flush_events<W: StationView + ?Sized>(&mut self, world: &W) {
        self.dispatch(world, self.tick);
    }

    /// A thrown object lands at `at`; nearby actors come to look.
    pub fn throw_distraction<W: StationView + ?Sized>(&mut self, at: Coord, noise: u8, world: &W) {
        let cfg = &self.config.investigation;
        let event = PerceptionEvent::noise(
            EventSource::Distraction,
            at,
            world.room_name_of(at),
            noise,
            cfg.distraction_priority,
            cfg.distraction_linger,
        );
        self.channel.publish(AiEvent::Perception(event));
        self.dispatch(world, self.tick);
    }

    /// Movement heard through the vent network at `at`.
    pub fn vent_noise<W: StationView + ?Sized>(&mut self, at: Coord, noise: u8, world: &W) {
        let cfg = &self.config.investigation;
        let event = PerceptionEvent::noise(
            EventSource::Vent,
            at,
            world.room_name_of(at),
            noise,
            cfg.vent_priority,
            cfg.vent_linger,
        );
        self.channel.publish(AiEvent::Perception(event));
        self.dispatch(world, self.tick);
    }

    /// The quarry tries to talk `observer` down. Returns false for an unknown observer.
    pub fn explain_away(&mut self, observer: ActorId, success: bool) -> bool {
        let quarry_pos = self
            .quarry
            .and_then(|id| self.actors.get(&id))
            .map(|q| q.pos);
        let Some(actor) = self.actors.get_mut(&observer) else {
            return false;
        };
        reactions::explain_away(actor, quarry_pos, success, &self.config, self.tick);
        true
    }

    pub fn advance_tick<W: StationMut + ?Sized>(
        &mut self,
        world: &mut W,
        mut perception: Option<&mut dyn Perception>,
    ) -> TickReport {
        self.tick += 1;
        let tick = self.tick;
        let clock = TickContext::new(tick, self.config.start_hour, self.seed);

        self.alert.advance(tick);
        coordination::countdown(self.actors.values_mut().filter_map(|a| a.coordination.as_mut()));
        self.dispatch(&*world, tick);

        let living = self.actors.values().filter(|a| a.is_ai_controlled()).count();
        let budget = &self.config.budget;
        self.budget
            .reset(ActionBudget::limit_for(budget.base, budget.per_actor, living));
        self.pathfinder.begin_tick(tick);

        let modifiers = self.alert.modifiers();
        let alert_active = self.alert.is_active();
        for actor in self.actors.values_mut() {
            actor.alert_aware = alert_active && !actor.infected;
        }

        let ids: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.is_ai_controlled())
            .map(|a| a.id)
            .collect();
        let mut decisions = Vec::with_capacity(ids.len());

        for id in ids {
            let Some(mut actor) = self.actors.remove(&id) else {
                continue;
            };
            let mut env = TickEnv {
                world: &mut *world,
                pathfinder: &mut self.pathfinder,
                budget: &mut self.budget,
                traps: &mut self.traps,
                channel: &self.channel,
                config: &self.config,
                clock,
                modifiers,
                quarry: self.quarry,
                hunt_target: self.hunt_target,
            };
            let decision =
                cascade::run(&mut actor, &self.actors, &mut env, perception.as_deref_mut());
            self.actors.insert(id, actor);
            decisions.push((id, decision));

            self.dispatch(&*world, tick);
        }

        let exhaustion_count = self.budget.exhaustion_count();
        if exhaustion_count > 0 {
            let limit = self.budget.limit();
            tracing::warn!(tick, exhaustion_count, limit, "AI budget exhausted");
            self.channel.publish(AiEvent::BudgetExhausted {
                tick,
                exhaustion_count,
                limit,
            });
        }

        let diagnostics = self.collect_diagnostics();
        TickReport {
            tick,
            hour: clock.hour,
            decisions,
            budget_limit: self.budget.limit(),
            budget_spent: self.budget.spent(),
            exhaustion_count,
            cache: self.pathfinder.stats(),
            alert: self.alert.state().clone(),
            diagnostics,
        }
    }

    /// Apply queued events until the queue settles, then let the alert see them.
    fn dispatch<W: StationView + ?Sized>(&mut self, world: &W, tick: u64) {
        loop {
            let events = self.reactions.drain();
            if events.is_empty() {
                break;
            }
            let mut env = ReactionEnv {
                world,
                pathfinder: &mut self.pathfinder,
                channel: &self.channel,
                config: &self.config,
                tick,
            };
            for event in &events {
                reactions::apply(event, &mut self.actors, &mut env);
            }
        }
        self.alert.pump(&self.actors, tick);
    }

    fn collect_diagnostics(&mut self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for event in self.tap.drain() {
            let Some(diagnostic) = diagnostic_for(&event) else {
                continue;
            };
            self.sink.emit(diagnostic.clone());
            out.push(diagnostic);
        }
        out
    }
}

fn diagnostic_for(event: &AiEvent) -> Option<Diagnostic> {
    let diagnostic = match event {
        AiEvent::BudgetExhausted {
            tick,
            exhaustion_count,
            limit,
        } => Diagnostic::new(*tick, tags::BUDGET_EXHAUSTED)
            .with_a(*exhaustion_count as u64)
            .with_b(*limit as u64),
        AiEvent::SearchStarted {
            actor,
            targets,
            tick,
            ..
        } => Diagnostic::new(*tick, tags::SEARCH_STARTED)
            .with_a(actor.0 as u64)
            .with_b(*targets as u64),
        AiEvent::CoordinationFormed {
            leader,
            allies,
            tick,
            ..
        } => Diagnostic::new(*tick, tags::COORDINATION_FORMED)
            .with_a(leader.0 as u64)
            .with_b(allies.len() as u64),
        AiEvent::TrapSprung {
            actor,
            trap,
            tick,
            ..
        } => Diagnostic::new(*tick, tags::TRAP_SPRUNG)
            .with_a(actor.0 as u64)
            .with_note(trap.clone()),
        AiEvent::Alert { signal, tick } => match signal {
            AlertSignal::Raised {
                observer,
                turns_remaining,
            } => Diagnostic::new(*tick, tags::ALERT_RAISED)
                .with_a(*turns_remaining as u64)
                .with_note(observer.clone()),
            AlertSignal::Easing {
                turns_remaining,
                message,
            } => Diagnostic::new(*tick, tags::ALERT_EASING)
                .with_a(*turns_remaining as u64)
                .with_note(message.clone()),
            AlertSignal::StandDown { message } => {
                Diagnostic::new(*tick, tags::ALERT_ENDED).with_note(message.clone())
            }
        },
        _ => return None,
    };
    Some(diagnostic)
}
