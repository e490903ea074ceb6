//! Detection capability consumed by the cascade.

use npc_core::DeterministicRng;

use crate::actor::Actor;
use crate::event::{Outcome, PerceptionEvent};

/// Situational inputs for one detection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerceptionContext {
    /// How loud the subject is.
    pub noise: u8,
    /// Room lighting and similar, added to the observer's pool.
    pub visibility_modifier: i32,
    /// Station alert bonus for the observer.
    pub alert_bonus: u8,
}

/// Decides whether `observer` notices `subject`.
///
/// Implementations own the probability model. The returned event's observer, subject and room are
/// normalized by the caller.
pub trait Perception {
    fn evaluate_detection(
        &mut self,
        observer: &Actor,
        subject: &Actor,
        context: &PerceptionContext,
        rng: &mut dyn DeterministicRng,
    ) -> PerceptionEvent;
}

/// Opposed pool contest: each die hits with `hit_chance`; the observer must beat the subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContestPerception {
    pub base_pool: u8,
    pub hit_chance: f32,
    pub detected_delta: u8,
    /// Suspicion gained when the subject only barely slips by.
    pub close_call_delta: u8,
}

impl Default for ContestPerception {
    fn default() -> Self {
        Self {
            base_pool: 3,
            hit_chance: 1.0 / 3.0,
            detected_delta: 3,
            close_call_delta: 1,
        }
    }
}

impl ContestPerception {
    fn roll(&self, pool: i32, rng: &mut dyn DeterministicRng) -> u8 {
        let dice = pool.clamp(1, u8::MAX as i32) as u8;
        (0..dice).filter(|_| rng.chance(self.hit_chance)).count() as u8
    }
}

impl Perception for ContestPerception {
    fn evaluate_detection(
        &mut self,
        observer: &Actor,
        subject: &Actor,
        context: &PerceptionContext,
        rng: &mut dyn DeterministicRng,
    ) -> PerceptionEvent {
        let base = self.base_pool as i32;
        let observer_pool = base
            + context.alert_bonus as i32
            + context.visibility_modifier
            + context.noise as i32 / 2;
        let subject_pool = base + 2;

        let seen = self.roll(observer_pool, rng);
        let hidden = self.roll(subject_pool, rng);

        let (outcome, delta) = if seen > hidden {
            (Outcome::Detected, self.detected_delta)
        } else if hidden - seen < 2 {
            (Outcome::Evaded, self.close_call_delta)
        } else {
            (Outcome::Evaded, 0)
        };

        PerceptionEvent::observed(observer.id, subject.id, outcome, String::new())
            .with_successes(seen, hidden)
            .with_delta(delta)
    }
}
