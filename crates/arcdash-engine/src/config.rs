//! Harness configuration.
//!
//! Dash tuning plus the scenario to run. Loaded from and saved to TOML.

use arcdash_common::{ArcdashError, ArcdashResult, ConfigError, Vec3};
use arcdash_gameplay::DashConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "arcdash.toml";

/// Full harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Dash tuning
    pub dash: DashConfig,
    /// What to simulate
    pub scenario: ScenarioConfig,
}

/// A single dash scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Where the walker starts (also the ground height)
    pub start: Vec3,
    /// Dash target
    pub target: Vec3,
    /// Variable frame length in seconds
    pub frame_dt: f32,
    /// Fixed physics step in seconds
    pub fixed_dt: f32,
    /// Total simulated time in seconds
    pub duration_seconds: f32,
    /// Interrupt the dash this many seconds after activation
    pub interrupt_at: Option<f32>,
    /// Flip the dash this many seconds after activation
    pub flip_at: Option<f32>,
    /// Flip yaw in degrees
    pub flip_angle: f32,
    /// Record a trajectory sample every N frames (0 = none)
    pub sample_every: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            target: Vec3::new(10.0, 0.0, 0.0),
            frame_dt: 1.0 / 144.0,
            fixed_dt: 1.0 / 50.0,
            duration_seconds: 3.0,
            interrupt_at: None,
            flip_at: None,
            flip_angle: 180.0,
            sample_every: 8,
        }
    }
}

impl SimConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting every failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ArcdashResult<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| ArcdashError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp scenario values to sensible ranges and check the dash tuning.
    ///
    /// Dash tuning is never clamped: a bad value is an error.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let scenario = &mut self.scenario;
        scenario.frame_dt = finite_or(scenario.frame_dt, 1.0 / 144.0).clamp(0.0005, 0.25);
        scenario.fixed_dt = finite_or(scenario.fixed_dt, 1.0 / 50.0).clamp(0.001, 0.1);
        scenario.duration_seconds = finite_or(scenario.duration_seconds, 3.0).clamp(0.0, 120.0);
        scenario.flip_angle = finite_or(scenario.flip_angle, 180.0);

        for (field, value) in [("start", scenario.start), ("target", scenario.target)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        self.dash.validate()
    }

    /// Number of frames the scenario runs for.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        (self.scenario.duration_seconds / self.scenario.frame_dt).ceil() as u64
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
