//! # Unified Configuration System
//!
//! All engine configuration lives here: frame timing, physics stepping,
//! and the scheduler's failure policy. Settings types are plain serde
//! structs loadable from TOML or RON files through the [`Config`] trait.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// How the scheduler reacts when a system fails mid-frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Abort the frame loop on the first system error (the default)
    #[default]
    Propagate,

    /// Log the failure with its system and frame context, then keep
    /// running the remaining systems
    ///
    /// Opting in trades fail-fast determinism for resilience: a frame may
    /// complete with some systems having skipped their update.
    Isolate,
}

/// Frame timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Target frames per second for the pacing sleep
    pub target_fps: f32,

    /// Upper clamp applied to per-frame delta time, in seconds
    pub max_dt: f32,

    /// Stop after this many frames (0 = run until stopped)
    pub max_frames: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            max_dt: 0.25,
            max_frames: 0,
        }
    }
}

/// Physics stepping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// World gravity vector in units per second squared
    pub gravity: [f32; 3],

    /// Fixed internal substep length in seconds
    pub fixed_timestep: f32,

    /// Maximum substeps consumed per frame
    pub max_substeps: u32,
}

impl PhysicsConfig {
    /// Gravity as a math vector
    pub fn gravity_vec(&self) -> Vec3 {
        Vec3::new(self.gravity[0], self.gravity[1], self.gravity[2])
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 3,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Scheduler failure policy
    ///
    /// Kept ahead of the nested sections so TOML output stays valid
    /// (plain values must precede tables).
    pub failure_policy: FailurePolicy,

    /// Frame timing settings
    pub timing: TimingConfig,

    /// Physics stepping settings
    pub physics: PhysicsConfig,
}

impl Config for EngineConfig {}
