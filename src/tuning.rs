use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Base combat numbers for one actor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Reflect)]
pub struct ActorStats {
    pub max_hp: u32,
    pub attack_power: u32,
    pub defense: u32,
    pub move_speed: i32,
}

impl ActorStats {
    pub const fn new(max_hp: u32, attack_power: u32, defense: u32, move_speed: i32) -> Self {
        Self { max_hp, attack_power, defense, move_speed }
    }
}

/// Horizontal thresholds for an enemy brain. `attack_range < chase_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Reflect)]
pub struct AiRanges {
    pub attack_range: i32,
    pub chase_range: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Reflect)]
#[serde(default)]
pub struct WorldBounds {
    pub left: i32,
    pub half_right: i32,
    pub right: i32,
    pub height: i32,
    pub ground_margin: i32,
    pub viewport_width: i32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            left: 0,
            half_right: 928,
            right: 1952,
            height: 396,
            ground_margin: 50,
            viewport_width: 928,
        }
    }
}

impl WorldBounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }
}

/// Every tunable number of the encounter. Loaded from JSON, all fields optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Resource, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct ArenaTuning {
    pub tick_ms: u64,
    pub max_step_ms: u64,
    pub player: ActorStats,
    pub grunt: ActorStats,
    pub boss: ActorStats,
    pub grunt_ai: AiRanges,
    pub boss_ai: AiRanges,
    pub invulnerability_ms: u64,
    pub hurt_freeze_ms: u64,
    pub combo_grace_ms: u64,
    pub growl_interval_ms: u64,
    pub grunt_spawn_x: Vec<i32>,
    pub world: WorldBounds,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            max_step_ms: 50,
            player: ActorStats::new(100, 20, 3, 8),
            grunt: ActorStats::new(40, 6, 0, 2),
            boss: ActorStats::new(100, 18, 5, 2),
            grunt_ai: AiRanges { attack_range: 120, chase_range: 2000 },
            boss_ai: AiRanges { attack_range: 220, chase_range: 700 },
            invulnerability_ms: 800,
            hurt_freeze_ms: 200,
            combo_grace_ms: 150,
            growl_interval_ms: 2000,
            grunt_spawn_x: vec![520, 700, 860],
            world: WorldBounds::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("tuning rejected: {0}")]
    Invalid(String),
}

impl ArenaTuning {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: Self = serde_json::from_str(&json).map_err(|source| TuningError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Loads the file, or logs why it could not and hands back the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                warn!("{err}; falling back to built-in tuning");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.tick_ms == 0 || self.max_step_ms == 0 {
            return Err(TuningError::Invalid("tick_ms and max_step_ms must be positive".into()));
        }
        for (name, stats) in [("player", self.player), ("grunt", self.grunt), ("boss", self.boss)] {
            if stats.max_hp == 0 {
                return Err(TuningError::Invalid(format!("{name}.max_hp must be positive")));
            }
            if stats.move_speed < 0 {
                return Err(TuningError::Invalid(format!("{name}.move_speed must not be negative")));
            }
        }
        for (name, ai) in [("grunt_ai", self.grunt_ai), ("boss_ai", self.boss_ai)] {
            if ai.attack_range < 0 || ai.attack_range >= ai.chase_range {
                return Err(TuningError::Invalid(format!(
                    "{name}: attack_range ({}) must be below chase_range ({})",
                    ai.attack_range, ai.chase_range
                )));
            }
        }
        let w = &self.world;
        if !(w.left < w.half_right && w.half_right <= w.right) {
            return Err(TuningError::Invalid("world bounds must satisfy left < half_right <= right".into()));
        }
        if w.viewport_width <= 0 || w.height <= 0 {
            return Err(TuningError::Invalid("world height and viewport width must be positive".into()));
        }
        Ok(())
    }

    pub fn max_step(&self) -> Duration {
        Duration::from_millis(self.max_step_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn invulnerability(&self) -> Duration {
        Duration::from_millis(self.invulnerability_ms)
    }

    pub fn hurt_freeze(&self) -> Duration {
        Duration::from_millis(self.hurt_freeze_ms)
    }

    pub fn combo_grace(&self) -> Duration {
        Duration::from_millis(self.combo_grace_ms)
    }

    pub fn growl_interval(&self) -> Duration {
        Duration::from_millis(self.growl_interval_ms)
    }
}
