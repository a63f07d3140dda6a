//! Tunable parameters for a Horde Survival run, loadable from TOML.
//!
//! Every field is optional in the file; omitted values fall back to the
//! defaults below. Unknown keys are rejected so typos surface early.

use std::{
    fs,
    path::{Path, PathBuf},
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, GridGeometry};

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for the expected schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A value parsed correctly but cannot drive a simulation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete set of tunables for a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Navigation grid layout.
    pub grid: GridConfig,
    /// Player attributes.
    pub player: PlayerConfig,
    /// Enemy attributes and movement constants.
    pub enemy: EnemyConfig,
    /// Enemy spawning cadence.
    pub spawning: SpawningConfig,
    /// Weapon and damage tunables.
    pub combat: CombatConfig,
    /// Debug switches.
    pub cheats: CheatConfig,
    /// Cells marked impassable when a run starts, as `[column, row]` pairs.
    pub obstacles: Vec<[i32; 2]>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            spawning: SpawningConfig::default(),
            combat: CombatConfig::default(),
            cheats: CheatConfig::default(),
            obstacles: DEFAULT_OBSTACLES.to_vec(),
        }
    }
}

const DEFAULT_OBSTACLES: [[i32; 2]; 13] = [
    [10, 13],
    [11, 13],
    [12, 13],
    [20, 5],
    [20, 6],
    [20, 7],
    [21, 5],
    [21, 6],
    [21, 7],
    [2, 6],
    [3, 6],
    [4, 6],
    [5, 6],
];

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Obstacle cells as coordinates.
    #[must_use]
    pub fn obstacle_cells(&self) -> Vec<CellCoord> {
        self.obstacles
            .iter()
            .map(|[column, row]| CellCoord::new(*column, *row))
            .collect()
    }

    /// Rejects values that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.dimension == 0 {
            return Err(ConfigError::Invalid("grid.dimension must be positive".into()));
        }
        if !(self.grid.cell_size > 0.0) {
            return Err(ConfigError::Invalid("grid.cell_size must be positive".into()));
        }
        if self.player.health <= 0 {
            return Err(ConfigError::Invalid("player.health must be positive".into()));
        }
        if !(self.enemy.drag > 0.0 && self.enemy.drag <= 1.0) {
            return Err(ConfigError::Invalid("enemy.drag must lie in (0, 1]".into()));
        }
        if !(self.enemy.timestep > 0.0) {
            return Err(ConfigError::Invalid("enemy.timestep must be positive".into()));
        }
        if self.enemy.radius < 0.0 {
            return Err(ConfigError::Invalid("enemy.radius must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&self.spawning.probability) {
            return Err(ConfigError::Invalid(
                "spawning.probability must lie in [0, 1]".into(),
            ));
        }
        if self.combat.shock_cost < 2 {
            return Err(ConfigError::Invalid(
                "combat.shock_cost must be at least 2 to damage enemies".into(),
            ));
        }
        Ok(())
    }
}

/// Navigation grid layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Cells per grid side.
    pub dimension: u32,
    /// Edge length of one cell in world units.
    pub cell_size: f32,
    /// World position of the grid's lower-left corner.
    pub origin: [f32; 2],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dimension: 32,
            cell_size: 40.0,
            origin: [0.0, 0.0],
        }
    }
}

impl GridConfig {
    /// Geometry described by this configuration.
    #[must_use]
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.dimension, self.cell_size, Vec2::from(self.origin))
    }
}

/// Player attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Starting and maximum health.
    pub health: i32,
    /// World units travelled per tick at full input.
    pub move_speed: f32,
    /// Cell whose centre the player starts on.
    pub start_cell: [i32; 2],
    /// Sprite size used for pickup collection.
    pub size: [f32; 2],
    /// Hitbox size used for enemy contact.
    pub hitbox: [f32; 2],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: 16,
            move_speed: 4.5,
            start_cell: [10, 10],
            size: [32.0, 48.0],
            hitbox: [12.0, 18.0],
        }
    }
}

/// Enemy attributes and movement constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    /// Starting health.
    pub health: i32,
    /// Collision radius used for separation and deflection.
    pub radius: f32,
    /// Sprite size used for broad-phase and attack overlap.
    pub size: [f32; 2],
    /// Acceleration applied along the steering heading.
    pub acceleration: f32,
    /// Per-unit-time velocity retention.
    pub drag: f32,
    /// Integration timestep.
    pub timestep: f32,
    /// Spring constant pushing enemies out of impassable cells.
    pub deflection_stiffness: f32,
    /// Fraction of overlap corrected between two enemies per tick.
    pub separation_stiffness: f32,
    /// Maximum number of living enemies.
    pub cap: usize,
    /// Score granted per kill.
    pub score_per_kill: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 1,
            radius: 16.0,
            size: [32.0, 42.0],
            acceleration: 0.01,
            drag: 0.96,
            timestep: 0.5,
            deflection_stiffness: 0.5,
            separation_stiffness: 0.75,
            cap: 300,
            score_per_kill: 10,
        }
    }
}

/// Enemy spawning cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawningConfig {
    /// Chance of one spawn per tick.
    pub probability: f64,
    /// Centre of the spawn ellipse.
    pub center: [f32; 2],
    /// Horizontal and vertical radii of the spawn ellipse.
    pub radii: [f32; 2],
    /// Seed for the spawn random number generator.
    pub seed: u64,
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            probability: 0.9,
            center: [640.0, 360.0],
            radii: [800.0, 500.0],
            seed: 0x5eed_0f_b017,
        }
    }
}

/// Weapon and damage tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombatConfig {
    /// Punch cooldown at level one, in ticks.
    pub punch_cooldown: u32,
    /// Cooldown reduction per level above one.
    pub punch_cooldown_step: u32,
    /// Shortest punch cooldown reachable through levelling.
    pub punch_cooldown_floor: u32,
    /// Lifetime of a punch attack in ticks.
    pub attack_life: u32,
    /// Horizontal offset of the punch from the player centre.
    pub attack_offset: f32,
    /// Initial punch size.
    pub attack_size: [f32; 2],
    /// Punch growth per tick.
    pub attack_growth: [f32; 2],
    /// Shock field cooldown in ticks.
    pub shock_cooldown: u32,
    /// Shock field lifetime in ticks.
    pub shock_duration: u32,
    /// Cost added to the covered cell while the shock field lasts.
    pub shock_cost: u32,
    /// Ticks between hazard damage applications.
    pub hazard_damage_interval: u64,
    /// Experience granted by an enemy drop.
    pub experience_per_pickup: u32,
    /// Every this many kills the drop is a health pickup instead; zero disables.
    pub health_drop_every: u32,
    /// Health restored by a health pickup.
    pub health_per_pickup: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            punch_cooldown: 65,
            punch_cooldown_step: 3,
            punch_cooldown_floor: 20,
            attack_life: 20,
            attack_offset: 25.0,
            attack_size: [30.0, 50.0],
            attack_growth: [0.15, 0.2],
            shock_cooldown: 240,
            shock_duration: 150,
            shock_cost: 2,
            hazard_damage_interval: 20,
            experience_per_pickup: 1,
            health_drop_every: 25,
            health_per_pickup: 4,
        }
    }
}

/// Debug switches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheatConfig {
    /// Keeps the run alive when the player's health runs out.
    pub god_mode: bool,
}
