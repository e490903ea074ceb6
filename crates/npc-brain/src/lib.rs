//! Turn-synchronous NPC decision engine.
//!
//! The [`AiScheduler`] owns every per-tick resource (action budget, path cache epoch, alert
//! snapshot, event channel) and drives a fixed-priority decision cascade for each living
//! non-player actor in ascending id order. Each concern of the cascade lives in its own module
//! as a pure step function:
//!
//! - [`suspicion`]: level decay and edge-triggered state transitions
//! - [`investigation`]: walk to a noise source, loiter, clear
//! - [`search`]: spiral sweep with visited-tile memory
//! - [`coordination`]: flank planning and pincer convergence
//! - [`hunter`]: revealed-hunter prey selection
//! - [`schedule`]: time-windowed routines

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actor;
pub mod alert;
pub mod budget;
mod cascade;
pub mod config;
pub mod coordination;
pub mod error;
pub mod event;
pub mod hunter;
pub mod investigation;
mod movement;
pub mod perception;
mod reactions;
pub mod scenario;
pub mod schedule;
pub mod scheduler;
pub mod search;
pub mod suspicion;
pub mod traps;

pub use actor::{
    Actor, Coordination, Investigation, Roster, ScheduleRule, SearchState, Suspicion,
    SuspicionState,
};
pub use alert::{AlertCoordinator, AlertModifiers, AlertState};
pub use budget::{ActionBudget, BudgetGrant};
pub use config::AiConfig;
pub use error::{ConfigError, ScenarioError};
pub use event::{AiEvent, AlertSignal, EventSource, Outcome, PerceptionEvent};
pub use perception::{ContestPerception, Perception, PerceptionContext};
pub use scenario::{ActorTemplate, Scenario, ScenarioFile, TrapTemplate};
pub use scheduler::{AiScheduler, Decision, TickReport};
pub use traps::{Trap, TrapRegistry};
