//! Engine tuning, loaded from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level tuning for the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// In-game hour at tick 0.
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,

    /// Probability that an idle actor wanders one tile.
    #[serde(default = "default_wander_chance")]
    pub wander_chance: f32,

    pub budget: BudgetConfig,
    pub suspicion: SuspicionConfig,
    pub alert: AlertConfig,
    pub investigation: InvestigationConfig,
    pub search: SearchConfig,
    pub coordination: CoordinationConfig,
    pub hunter: HunterConfig,
}

fn default_start_hour() -> u8 {
    19
}
fn default_wander_chance() -> f32 {
    0.3
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            wander_chance: default_wander_chance(),
            budget: BudgetConfig::default(),
            suspicion: SuspicionConfig::default(),
            alert: AlertConfig::default(),
            investigation: InvestigationConfig::default(),
            search: SearchConfig::default(),
            coordination: CoordinationConfig::default(),
            hunter: HunterConfig::default(),
        }
    }
}

/// Per-tick action budget: `limit = base + per_actor * living`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub base: u32,
    pub per_actor: u32,
    pub costs: BudgetCosts,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            base: 20,
            per_actor: 3,
            costs: BudgetCosts::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetCosts {
    pub fresh_path: u32,
    pub cached_path: u32,
    pub perception: u32,
    pub confrontation: u32,
}

impl Default for BudgetCosts {
    fn default() -> Self {
        Self {
            fresh_path: 4,
            cached_path: 1,
            perception: 2,
            confrontation: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionConfig {
    pub question_threshold: u8,
    pub follow_threshold: u8,
    pub max: u8,
    /// Ticks without an increase before decay starts.
    pub decay_delay: u64,
    pub decay_amount: u8,
}

impl Default for SuspicionConfig {
    fn default() -> Self {
        Self {
            question_threshold: 3,
            follow_threshold: 6,
            max: 10,
            decay_delay: 3,
            decay_amount: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub duration: u8,
    pub observation_bonus: u8,
    /// Speed multiplier while more than half the alert remains.
    pub early_speed: f32,
    pub late_speed: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            duration: 10,
            observation_bonus: 2,
            early_speed: 1.5,
            late_speed: 1.25,
        }
    }
}

/// Upper bound accepted for [`InvestigationConfig::turns`].
pub const MAX_INVESTIGATION_TURNS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationConfig {
    /// Ticks an investigation goal stays valid.
    pub turns: u64,
    /// Hearing range is `noise + hearing_margin` (Manhattan).
    pub hearing_margin: u32,
    pub close_call_priority: u8,
    pub close_call_linger: u8,
    pub distraction_priority: u8,
    pub distraction_linger: u8,
    pub vent_priority: u8,
    pub vent_linger: u8,
    pub trap_priority: u8,
    pub trap_linger: u8,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            turns: 3,
            hearing_margin: 2,
            close_call_priority: 2,
            close_call_linger: 2,
            distraction_priority: 1,
            distraction_linger: 3,
            vent_priority: 3,
            vent_linger: 3,
            trap_priority: 3,
            trap_linger: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub turns: u8,
    pub spiral_radius: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            turns: 8,
            spiral_radius: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    pub turns: u8,
    /// Re-target once the quarry is farther than this from the ambush target.
    pub retarget_distance: u32,
    /// Distances tried along each flank lane, nearest first.
    pub flank_distances: Vec<i32>,
    /// Suspicion the springing participant gains from the forced detection.
    pub engage_delta: u8,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            turns: 5,
            retarget_distance: 3,
            flank_distances: vec![2, 3],
            engage_delta: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub hold_chance: f32,
    pub hold_min_distance: u32,
    pub hold_max_distance: u32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            hold_chance: 0.7,
            hold_min_distance: 2,
            hold_max_distance: 4,
        }
    }
}

impl AiConfig {
    /// Load configuration from a YAML file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.start_hour >= 24 {
            return Err(invalid("start_hour", format!("{} is not an hour", self.start_hour)));
        }
        for (field, p) in [
            ("wander_chance", self.wander_chance),
            ("hunter.hold_chance", self.hunter.hold_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, format!("{p} is not a probability")));
            }
        }

        let s = &self.suspicion;
        if s.question_threshold == 0 || s.question_threshold >= s.follow_threshold {
            return Err(invalid(
                "suspicion.question_threshold",
                "must be positive and below follow_threshold",
            ));
        }
        if s.follow_threshold > s.max {
            return Err(invalid("suspicion.follow_threshold", "must not exceed max"));
        }

        if self.alert.duration < 2 {
            return Err(invalid("alert.duration", "must be at least 2 turns"));
        }
        if self.alert.early_speed < 1.0 || self.alert.late_speed < 1.0 {
            return Err(invalid("alert.early_speed", "speed multipliers must be >= 1.0"));
        }

        if self.investigation.turns > MAX_INVESTIGATION_TURNS {
            return Err(invalid(
                "investigation.turns",
                format!("must not exceed {MAX_INVESTIGATION_TURNS}"),
            ));
        }

        if self.search.turns == 0 {
            return Err(invalid("search.turns", "must be positive"));
        }
        if self.coordination.turns == 0 {
            return Err(invalid("coordination.turns", "must be positive"));
        }
        if self.coordination.flank_distances.is_empty()
            || self.coordination.flank_distances.iter().any(|d| *d <= 0)
        {
            return Err(invalid(
                "coordination.flank_distances",
                "needs at least one positive distance",
            ));
        }
        if self.budget.costs.cached_path > self.budget.costs.fresh_path {
            return Err(invalid(
                "budget.costs.cached_path",
                "a cache hit must not cost more than a fresh query",
            ));
        }
        Ok(())
    }
}
