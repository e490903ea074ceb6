//! Grid navigation for turn-based NPC simulation.
//!
//! - [`Pathfinder`]: 8-directional A* with a cache scoped to a single tick.
//! - [`StationGrid`]: reference world of named rooms, walls, barricades and vents.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod pathfinder;
pub mod station;

pub use pathfinder::{path_cost, search, CacheStats, PathResult, Pathfinder};
pub use station::{
    RoomRect, StationGrid, StationLayout, BARRICADE_MAX_STRENGTH, MAX_STATION_SIDE,
};
