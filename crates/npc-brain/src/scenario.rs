//! Scenario files: engine config, station layout, actor and trap templates in one YAML document.
//!
//! Templates are validated once at load time; a [`Scenario`] that loaded successfully always
//! builds.

use std::path::Path;

use npc_core::{ActorId, Coord, GridView, StationView};
use npc_nav::{StationGrid, StationLayout, MAX_STATION_SIDE};
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ScheduleRule};
use crate::alert::AlertState;
use crate::config::AiConfig;
use crate::error::ScenarioError;
use crate::scheduler::AiScheduler;
use crate::traps::Trap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub config: AiConfig,
    pub seed: u64,
    /// Omitted means the default outpost.
    pub station: Option<StationLayout>,
    pub actors: Vec<ActorTemplate>,
    pub traps: Vec<TrapTemplate>,
    /// Name of the actor everyone converges on.
    pub hunt_target: Option<String>,
    /// Resume a persisted alert.
    pub alert: Option<AlertState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTemplate {
    pub name: Option<String>,
    pub role: String,
    pub position: Option<Coord>,
    /// Start at this room's anchor when no position is given.
    pub room: Option<String>,
    pub player: bool,
    pub infected: bool,
    pub revealed: bool,
    pub noise: Option<u8>,
    pub schedule: Vec<ScheduleRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapTemplate {
    pub at: Coord,
    pub name: String,
    #[serde(default = "default_trap_noise")]
    pub noise: u8,
    #[serde(default)]
    pub owner: Option<String>,
}

fn default_trap_noise() -> u8 {
    6
}

/// A validated scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    file: ScenarioFile,
    grid: StationGrid,
    actors: Vec<Actor>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = serde_yaml::from_str(content)?;
        Self::from_file(file)
    }

    pub fn from_file(file: ScenarioFile) -> Result<Self, ScenarioError> {
        file.config.validate()?;

        let grid = match &file.station {
            Some(layout) => {
                let fits = |side: i32| {
                    u32::try_from(side).is_ok_and(|s| (1..=MAX_STATION_SIDE).contains(&s))
                };
                if !fits(layout.width) || !fits(layout.height) {
                    return Err(ScenarioError::StationSize {
                        width: layout.width,
                        height: layout.height,
                        max: MAX_STATION_SIDE,
                    });
                }
                StationGrid::from_layout(layout)
            }
            None => StationGrid::outpost(),
        };

        let mut actors = Vec::with_capacity(file.actors.len());
        for (index, template) in file.actors.iter().enumerate() {
            let id = ActorId(index as u32 + 1);
            actors.push(instantiate(id, index, template, &grid)?);
        }

        let known = |name: &str| actors.iter().any(|a: &Actor| a.name == name);
        if let Some(name) = &file.hunt_target {
            if !known(name) {
                return Err(ScenarioError::UnknownActor(name.clone()));
            }
        }
        for trap in &file.traps {
            if let Some(owner) = &trap.owner {
                if !known(owner) {
                    return Err(ScenarioError::UnknownActor(owner.clone()));
                }
            }
            if !grid.in_bounds(trap.at) {
                return Err(ScenarioError::OutOfBounds {
                    actor: trap.name.clone(),
                    at: trap.at,
                });
            }
        }

        Ok(Self { file, grid, actors })
    }

    pub fn config(&self) -> &AiConfig {
        &self.file.config
    }

    pub fn file(&self) -> &ScenarioFile {
        &self.file
    }

    pub fn grid(&self) -> &StationGrid {
        &self.grid
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Fresh scheduler and world, ready for tick 1.
    pub fn build(&self) -> (AiScheduler, StationGrid) {
        let mut scheduler = AiScheduler::new(self.file.config.clone(), self.file.seed);
        for actor in &self.actors {
            scheduler.insert_actor(actor.clone());
        }

        let id_of = |name: &str| self.actors.iter().find(|a| a.name == name).map(|a| a.id);
        for trap in &self.file.traps {
            let mut deployed = Trap::new(trap.name.clone(), trap.noise);
            deployed.owner = trap.owner.as_deref().and_then(id_of);
            scheduler.deploy_trap(trap.at, deployed);
        }
        scheduler.set_hunt_target(self.file.hunt_target.as_deref().and_then(id_of));
        if let Some(alert) = &self.file.alert {
            scheduler.restore_alert(alert.clone());
        }

        (scheduler, self.grid.clone())
    }
}

fn instantiate(
    id: ActorId,
    index: usize,
    template: &ActorTemplate,
    grid: &StationGrid,
) -> Result<Actor, ScenarioError> {
    let name = template
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or(ScenarioError::MissingField {
            index,
            field: "name",
        })?;

    let pos = match (&template.position, &template.room) {
        (Some(pos), _) => *pos,
        (None, Some(room)) => grid.room_anchor(room).ok_or_else(|| ScenarioError::UnknownRoom {
            actor: name.clone(),
            room: room.clone(),
        })?,
        (None, None) => {
            return Err(ScenarioError::MissingField {
                index,
                field: "position",
            })
        }
    };
    if !grid.in_bounds(pos) {
        return Err(ScenarioError::OutOfBounds { actor: name, at: pos });
    }

    for rule in &template.schedule {
        for hour in [rule.start_hour, rule.end_hour] {
            if hour > 24 {
                return Err(ScenarioError::InvalidHour {
                    actor: name,
                    hour,
                });
            }
        }
        if grid.room(&rule.room).is_none() {
            return Err(ScenarioError::UnknownRoom {
                actor: name,
                room: rule.room.clone(),
            });
        }
    }

    let mut actor = Actor::new(id, name, pos)
        .with_role(template.role.clone())
        .with_schedule(template.schedule.clone());
    if let Some(noise) = template.noise {
        actor.noise = noise;
    }
    actor.player = template.player;
    actor.infected = template.infected || template.revealed;
    actor.revealed = template.revealed;
    Ok(actor)
}
