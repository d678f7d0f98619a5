use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::RedChannelPolicy;
use crate::physics::{BOUNCE, FRICTION, MAX_VELOCITY, STANDARD_GRAVITY, TICK_INTERVAL_MS};

/// Physics constants for a `MotionIntegrator`.
///
/// Defaults are the fixed constants in `physics`. A config is read once at
/// startup and is immutable for the lifetime of the integrator built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Per-tick velocity multiplier (velocity *= friction).
    pub friction: f32,
    /// Fraction of velocity kept, sign-flipped, after hitting a bound.
    pub bounce: f32,
    /// Velocity for a full 1 g tilt on one axis.
    pub max_velocity: f32,
    /// Divisor that normalizes accelerometer readings (m/s²).
    pub gravity: f32,
    /// Fixed tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Handling of red channel values above 255.
    pub red_channel: RedChannelPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            bounce: BOUNCE,
            max_velocity: MAX_VELOCITY,
            gravity: STANDARD_GRAVITY,
            tick_interval_ms: TICK_INTERVAL_MS,
            red_channel: RedChannelPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FrictionOutOfRange(f32),
    BounceOutOfRange(f32),
    NonPositiveMaxVelocity(f32),
    NonPositiveGravity(f32),
    ZeroTickInterval,
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrictionOutOfRange(v) => write!(f, "friction must be in [0, 1], got {v}"),
            Self::BounceOutOfRange(v) => write!(f, "bounce must be in [0, 1], got {v}"),
            Self::NonPositiveMaxVelocity(v) => {
                write!(f, "max_velocity must be > 0, got {v}")
            },
            Self::NonPositiveGravity(v) => write!(f, "gravity must be > 0, got {v}"),
            Self::ZeroTickInterval => write!(f, "tick_interval_ms must be > 0"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PhysicsConfig {
    /// Check every constant. NaN fails every range check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(ConfigError::FrictionOutOfRange(self.friction));
        }
        if !(0.0..=1.0).contains(&self.bounce) {
            return Err(ConfigError::BounceOutOfRange(self.bounce));
        }
        if !(self.max_velocity > 0.0 && self.max_velocity.is_finite()) {
            return Err(ConfigError::NonPositiveMaxVelocity(self.max_velocity));
        }
        if !(self.gravity > 0.0 && self.gravity.is_finite()) {
            return Err(ConfigError::NonPositiveGravity(self.gravity));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Parse and validate a standalone `[physics]`-shaped TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config =
            toml::from_str::<Self>(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
