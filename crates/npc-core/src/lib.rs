//! Deterministic, engine-agnostic primitives for turn-based NPC simulation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actor;
pub mod coord;
pub mod events;
pub mod rng;
pub mod tick;
pub mod world;

pub use actor::{ActorId, StableId};
pub use coord::Coord;
pub use events::{EventChannel, Subscription};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::{BreakAttempt, GridView, StationMut, StationView};
