//! Actor records. Every AI field round-trips through serde.

use std::collections::{BTreeMap, BTreeSet};

use npc_core::{ActorId, Coord};
use serde::{Deserialize, Serialize};

/// Actors keyed by id; iteration order is the tick processing order.
pub type Roster = BTreeMap<ActorId, Actor>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionState {
    #[default]
    Idle,
    Question,
    Follow,
    Coordinating,
}

impl SuspicionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Question => "question",
            Self::Follow => "follow",
            Self::Coordinating => "coordinating",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suspicion {
    pub level: u8,
    pub state: SuspicionState,
    /// Tick of the last increase; decay waits on it.
    pub last_raised: Option<u64>,
    /// Whether this actor already confronted the quarry in the current question phase.
    pub confronted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub goal: Coord,
    pub priority: u8,
    pub expires_at: u64,
    /// Ticks left to loiter once the goal is reached.
    pub linger: u8,
    pub arrived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub anchor: Coord,
    pub radius: u8,
    pub targets: Vec<Coord>,
    #[serde(default)]
    pub visited_tiles: BTreeSet<Coord>,
    #[serde(default)]
    pub visited_rooms: BTreeSet<String>,
    pub turns_remaining: u8,
    #[serde(default)]
    pub current: Option<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordination {
    pub target: Coord,
    /// `None` approaches the target directly (the leader, or allies without a usable flank).
    pub flank: Option<Coord>,
    pub leader: ActorId,
    pub turns_remaining: u8,
}

/// Time window `[start_hour, end_hour)`; `start_hour >= end_hour` wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    #[serde(alias = "start")]
    pub start_hour: u8,
    #[serde(alias = "end")]
    pub end_hour: u8,
    pub room: String,
}

impl ScheduleRule {
    pub fn new(start_hour: u8, end_hour: u8, room: impl Into<String>) -> Self {
        Self {
            start_hour,
            end_hour,
            room: room.into(),
        }
    }

    pub fn is_active(&self, hour: u8) -> bool {
        if self.start_hour < self.end_hour {
            self.start_hour <= hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub pos: Coord,
    #[serde(default = "default_true")]
    pub alive: bool,
    /// Player-controlled; never driven by the cascade.
    #[serde(default)]
    pub player: bool,
    #[serde(default)]
    pub infected: bool,
    #[serde(default)]
    pub revealed: bool,
    /// Noise this actor makes when observed, `1..`.
    #[serde(default = "default_noise")]
    pub noise: u8,

    #[serde(default)]
    pub suspicion: Suspicion,
    #[serde(default)]
    pub last_known: Option<Coord>,
    #[serde(default)]
    pub in_contact: bool,
    #[serde(default)]
    pub investigation: Option<Investigation>,
    #[serde(default)]
    pub search: Option<SearchState>,
    #[serde(default)]
    pub coordination: Option<Coordination>,
    #[serde(default)]
    pub alert_aware: bool,
    #[serde(default)]
    pub hunting: bool,
    #[serde(default)]
    pub schedule: Vec<ScheduleRule>,
}

fn default_true() -> bool {
    true
}
fn default_noise() -> u8 {
    5
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, pos: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            role: String::new(),
            pos,
            alive: true,
            player: false,
            infected: false,
            revealed: false,
            noise: default_noise(),
            suspicion: Suspicion::default(),
            last_known: None,
            in_contact: false,
            investigation: None,
            search: None,
            coordination: None,
            alert_aware: false,
            hunting: false,
            schedule: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn as_player(mut self) -> Self {
        self.player = true;
        self
    }

    pub fn infected(mut self) -> Self {
        self.infected = true;
        self
    }

    pub fn revealed(mut self) -> Self {
        self.infected = true;
        self.revealed = true;
        self
    }

    pub fn with_schedule(mut self, schedule: Vec<ScheduleRule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Alive and not player-controlled.
    pub fn is_ai_controlled(&self) -> bool {
        self.alive && !self.player
    }

    /// Hidden infected actors are the only ones that take part in ambushes.
    pub fn can_coordinate(&self) -> bool {
        self.alive && self.infected && !self.revealed
    }

    /// Valid prey for a revealed hunter.
    pub fn is_prey(&self) -> bool {
        self.alive && !self.infected
    }

    /// Drops every transient AI sub-state, e.g. on death.
    pub fn reset_ai(&mut self) {
        self.suspicion = Suspicion::default();
        self.last_known = None;
        self.in_contact = false;
        self.investigation = None;
        self.search = None;
        self.coordination = None;
        self.alert_aware = false;
        self.hunting = false;
    }
}
