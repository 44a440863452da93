//! Dash tuning values.

use arcdash_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Tuning for one dash ability. Immutable once the ability is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Base gravity magnitude (sign is ignored)
    pub gravity_base: f32,
    /// Gravity multiplier while rising
    pub gravity_multiplier_up: f32,
    /// Gravity multiplier while falling
    pub gravity_multiplier_down: f32,
    /// Apex height above the target
    pub base_arc_height: f32,
    /// Charge delay before launch, in real seconds
    pub charge_time_seconds: f32,
    /// Cooldown after the dash lands, in real seconds
    pub cooldown_seconds: f32,
    /// Pacing of this ability relative to the simulation clock
    pub time_multiplier: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            gravity_base: 9.81,
            gravity_multiplier_up: 1.0,
            gravity_multiplier_down: 1.5,
            base_arc_height: 2.0,
            charge_time_seconds: 0.2,
            cooldown_seconds: 1.0,
            time_multiplier: 1.0,
        }
    }
}

impl DashConfig {
    /// Creates the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same tuning with a different time multiplier.
    #[must_use]
    pub fn with_time_multiplier(mut self, time_multiplier: f32) -> Self {
        self.time_multiplier = time_multiplier;
        self
    }

    /// Gravity magnitude applied while the dash rises.
    #[must_use]
    pub fn gravity_up(&self) -> f32 {
        self.gravity_base.abs() * self.gravity_multiplier_up
    }

    /// Gravity magnitude applied while the dash falls.
    #[must_use]
    pub fn gravity_down(&self) -> f32 {
        self.gravity_base.abs() * self.gravity_multiplier_down
    }

    /// Signed vertical acceleration for a body moving with vertical speed `vy`.
    #[must_use]
    pub fn gravity_for(&self, vy: f32) -> f32 {
        if vy < 0.0 {
            -self.gravity_down()
        } else {
            -self.gravity_up()
        }
    }

    /// Checks every value. All time and gravity values must be finite and
    /// strictly positive; the arc height may be zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravity_base", self.gravity_base.abs()),
            ("gravity_multiplier_up", self.gravity_multiplier_up),
            ("gravity_multiplier_down", self.gravity_multiplier_down),
            ("charge_time_seconds", self.charge_time_seconds),
            ("cooldown_seconds", self.cooldown_seconds),
            ("time_multiplier", self.time_multiplier),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if !self.base_arc_height.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "base_arc_height",
            });
        }
        if self.base_arc_height < 0.0 {
            return Err(ConfigError::Negative {
                field: "base_arc_height",
                value: self.base_arc_height,
            });
        }
        Ok(())
    }
}
