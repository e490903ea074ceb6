use std::path::PathBuf;

use npc_core::Coord;

/// Invalid or unreadable engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Malformed scenario or actor template. Raised only while loading, before the first tick.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("station is {width}x{height}; each side must be within 1..={max}")]
    StationSize { width: i32, height: i32, max: u32 },

    #[error("actor template #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("actor `{actor}` starts outside the station at {at}")]
    OutOfBounds { actor: String, at: Coord },

    #[error("actor `{actor}` has a schedule entry for unknown room `{room}`")]
    UnknownRoom { actor: String, room: String },

    #[error("actor `{actor}` has a schedule hour outside 0..=24: {hour}")]
    InvalidHour { actor: String, hour: u8 },

    #[error("scenario names unknown actor `{0}`")]
    UnknownActor(String),
}
