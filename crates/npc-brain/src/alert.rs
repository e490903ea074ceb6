//! Station-wide vigilance timer.
//!
//! A detection by a non-infected observer puts the station on alert for a fixed number of turns.
//! While alert, observers get a perception bonus that shrinks with the remaining time, and
//! alert-aware actors move faster during the first half of the alert.

use npc_core::{EventChannel, Subscription};
use serde::{Deserialize, Serialize};

use crate::actor::Roster;
use crate::config::AlertConfig;
use crate::event::{AiEvent, AlertSignal, EventSource};

const EASING_MESSAGE: &str = "The station is calming down. Alert level decreasing.";
const WINDING_DOWN_MESSAGE: &str = "Crew vigilance returning to normal levels.";
const STAND_DOWN_MESSAGE: &str = "Station alert has ended. Crew returning to normal routines.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    #[serde(rename = "alert_active")]
    pub active: bool,
    #[serde(rename = "alert_turns_remaining")]
    pub turns_remaining: u8,
    #[serde(default)]
    pub triggering_observer: Option<String>,
}

/// Values the cascade reads for a whole tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertModifiers {
    pub observation_bonus: u8,
    pub speed_multiplier: f32,
}

impl Default for AlertModifiers {
    fn default() -> Self {
        Self {
            observation_bonus: 0,
            speed_multiplier: 1.0,
        }
    }
}

pub struct AlertCoordinator {
    state: AlertState,
    config: AlertConfig,
    channel: EventChannel<AiEvent>,
    subscription: Subscription<AiEvent>,
}

impl AlertCoordinator {
    pub fn new(channel: &EventChannel<AiEvent>, config: AlertConfig) -> Self {
        Self {
            state: AlertState::default(),
            config,
            channel: channel.clone(),
            subscription: channel.subscribe(),
        }
    }

    /// Consume queued events; detections by non-infected observers raise the alert.
    ///
    /// Returns how many events (re)armed the alert.
    pub fn pump(&mut self, roster: &Roster, tick: u64) -> usize {
        let mut armed = 0;
        for event in self.subscription.drain() {
            let AiEvent::Perception(perception) = event else {
                continue;
            };
            if !perception.is_detection() || perception.source != EventSource::Observer {
                continue;
            }
            let Some(observer) = perception.observer.and_then(|id| roster.get(&id)) else {
                continue;
            };
            if observer.infected {
                continue;
            }
            if self.trigger(&observer.name, tick) {
                armed += 1;
            }
        }
        armed
    }

    /// Arms the alert unless it is already active with at least half its duration left.
    pub fn trigger(&mut self, observer: &str, tick: u64) -> bool {
        let half = self.config.duration / 2;
        if self.state.active && self.state.turns_remaining >= half {
            return false;
        }
        self.arm(observer, self.config.duration, tick);
        true
    }

    /// Scripted alert, e.g. a station-wide emergency. Always arms.
    pub fn force_trigger(&mut self, turns: u8, tick: u64) {
        self.arm("station", turns.max(1), tick);
    }

    fn arm(&mut self, observer: &str, turns: u8, tick: u64) {
        self.state.active = true;
        self.state.turns_remaining = turns;
        self.state.triggering_observer = Some(observer.to_string());
        tracing::info!(observer, turns, tick, "station alert raised");
        self.channel.publish(AiEvent::Alert {
            signal: AlertSignal::Raised {
                observer: observer.to_string(),
                turns_remaining: turns,
            },
            tick,
        });
    }

    /// One turn of decay.
    pub fn advance(&mut self, tick: u64) {
        if !self.state.active {
            return;
        }
        self.state.turns_remaining = self.state.turns_remaining.saturating_sub(1);
        let remaining = self.state.turns_remaining;

        let signal = if remaining == 0 {
            self.state.active = false;
            self.state.triggering_observer = None;
            tracing::info!(tick, "station alert ended");
            AlertSignal::StandDown {
                message: STAND_DOWN_MESSAGE.to_string(),
            }
        } else if remaining == self.config.duration / 2 {
            AlertSignal::Easing {
                turns_remaining: remaining,
                message: EASING_MESSAGE.to_string(),
            }
        } else if remaining == 2 {
            AlertSignal::Easing {
                turns_remaining: remaining,
                message: WINDING_DOWN_MESSAGE.to_string(),
            }
        } else {
            return;
        };
        self.channel.publish(AiEvent::Alert { signal, tick });
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn turns_remaining(&self) -> u8 {
        self.state.turns_remaining
    }

    /// `ceil(base * remaining / duration)`, at least 1 while active and 0 when calm.
    pub fn observation_bonus(&self) -> u8 {
        if !self.state.active {
            return 0;
        }
        let base = self.config.observation_bonus as u32;
        let duration = self.config.duration.max(1) as u32;
        let remaining = (self.state.turns_remaining as u32).min(duration);
        let scaled = (base * remaining).div_ceil(duration);
        scaled.clamp(1, base.max(1)) as u8
    }

    pub fn speed_multiplier(&self) -> f32 {
        if !self.state.active {
            1.0
        } else if self.state.turns_remaining > self.config.duration / 2 {
            self.config.early_speed
        } else {
            self.config.late_speed
        }
    }

    pub fn modifiers(&self) -> AlertModifiers {
        AlertModifiers {
            observation_bonus: self.observation_bonus(),
            speed_multiplier: self.speed_multiplier(),
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn restore(&mut self, state: AlertState) {
        self.state = state;
        if self.state.turns_remaining == 0 {
            self.state.active = false;
        }
    }
}
