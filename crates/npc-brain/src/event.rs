use npc_core::{ActorId, Coord};
use serde::{Deserialize, Serialize};

use crate::actor::SuspicionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Detected,
    Evaded,
}

/// Where a perception event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// An actor rolled a detection check.
    Observer,
    /// Guaranteed detection at the end of a coordinated ambush.
    Ambush,
    Trap,
    Distraction,
    Vent,
}

impl EventSource {
    /// Noise sources carry a bare coordinate instead of an observing actor.
    pub fn is_noise(self) -> bool {
        matches!(self, Self::Trap | Self::Distraction | Self::Vent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptionEvent {
    pub observer: Option<ActorId>,
    pub subject: Option<ActorId>,
    pub outcome: Outcome,
    pub observer_successes: u8,
    pub subject_successes: u8,
    pub suspicion_delta: u8,
    pub room: String,
    /// Bare coordinate for non-actor sources.
    pub target: Option<Coord>,
    pub noise: u8,
    pub priority: u8,
    pub linger: u8,
    pub source: EventSource,
}

impl PerceptionEvent {
    pub fn observed(
        observer: ActorId,
        subject: ActorId,
        outcome: Outcome,
        room: impl Into<String>,
    ) -> Self {
        Self {
            observer: Some(observer),
            subject: Some(subject),
            outcome,
            observer_successes: 0,
            subject_successes: 0,
            suspicion_delta: 0,
            room: room.into(),
            target: None,
            noise: 0,
            priority: 0,
            linger: 0,
            source: EventSource::Observer,
        }
    }

    /// A sound at `at` that nearby actors may investigate.
    pub fn noise(
        source: EventSource,
        at: Coord,
        room: impl Into<String>,
        noise: u8,
        priority: u8,
        linger: u8,
    ) -> Self {
        Self {
            observer: None,
            subject: None,
            outcome: Outcome::Detected,
            observer_successes: 0,
            subject_successes: 0,
            suspicion_delta: 0,
            room: room.into(),
            target: Some(at),
            noise,
            priority,
            linger,
            source,
        }
    }

    pub fn with_successes(mut self, observer: u8, subject: u8) -> Self {
        self.observer_successes = observer;
        self.subject_successes = subject;
        self
    }

    pub fn with_delta(mut self, delta: u8) -> Self {
        self.suspicion_delta = delta;
        self
    }

    pub fn with_source(mut self, source: EventSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_subject(mut self, subject: ActorId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn is_detection(&self) -> bool {
        self.outcome == Outcome::Detected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertSignal {
    Raised {
        observer: String,
        turns_remaining: u8,
    },
    Easing {
        turns_remaining: u8,
        message: String,
    },
    StandDown {
        message: String,
    },
}

/// Everything the engine announces. Presentation layers subscribe to the scheduler's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AiEvent {
    Perception(PerceptionEvent),
    SuspicionChanged {
        actor: ActorId,
        from: SuspicionState,
        to: SuspicionState,
        tick: u64,
    },
    Confrontation {
        actor: ActorId,
        quarry: ActorId,
        tick: u64,
    },
    InvestigationArrived {
        actor: ActorId,
        at: Coord,
        tick: u64,
    },
    SearchStarted {
        actor: ActorId,
        anchor: Coord,
        targets: usize,
        tick: u64,
    },
    SearchEnded {
        actor: ActorId,
        tick: u64,
    },
    CoordinationFormed {
        leader: ActorId,
        allies: Vec<ActorId>,
        target: Coord,
        tick: u64,
    },
    CoordinationEnded {
        actor: ActorId,
        tick: u64,
    },
    Attack {
        attacker: ActorId,
        target: ActorId,
        tick: u64,
    },
    AmbushHeld {
        actor: ActorId,
        tick: u64,
    },
    HuntJoined {
        actor: ActorId,
        target: ActorId,
        tick: u64,
    },
    BarricadeAttempt {
        actor: ActorId,
        room: String,
        success: bool,
        message: String,
    },
    TrapSprung {
        actor: ActorId,
        at: Coord,
        trap: String,
        tick: u64,
    },
    Alert {
        signal: AlertSignal,
        tick: u64,
    },
    BudgetExhausted {
        tick: u64,
        exhaustion_count: u32,
        limit: u32,
    },
}
