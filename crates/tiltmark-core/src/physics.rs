use serde::{Deserialize, Serialize};

use crate::color::MarkerColor;
use crate::config::PhysicsConfig;
use crate::readout::gyroscope_text;

/// Friction multiplier per tick (velocity *= FRICTION each tick).
pub const FRICTION: f32 = 0.9;
/// Fraction of velocity kept (sign-flipped) when the marker hits an edge.
pub const BOUNCE: f32 = 0.8;
/// Velocity produced by a full 1 g tilt along one axis.
pub const MAX_VELOCITY: f32 = 10.0;
/// Standard gravity (m/s²), the accelerometer normalization divisor.
pub const STANDARD_GRAVITY: f32 = 9.80665;
/// Fixed tick period in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 16;

/// Velocity and position of the marker, in screen units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub position_x: f32,
    pub position_y: f32,
}

/// Current container and marker size, queried once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerGeometry {
    pub container_width: f32,
    pub container_height: f32,
    pub marker_width: f32,
    pub marker_height: f32,
}

/// Allowed marker translation range for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// The marker may hang half its size past the leading edges and stops
    /// half its size short of the trailing ones.
    pub fn from_geometry(geometry: &ContainerGeometry) -> Self {
        let half_width = geometry.marker_width / 2.0;
        let half_height = geometry.marker_height / 2.0;
        Self {
            min_x: -half_width,
            max_x: geometry.container_width - half_width,
            min_y: -half_height,
            max_y: geometry.container_height - half_height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Marker translation to hand to the render sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub x: f32,
    pub y: f32,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub position: MarkerPosition,
    pub bounced_x: bool,
    pub bounced_y: bool,
}

/// What a gyroscope sample produces besides the velocity change.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularRateReadout {
    pub text: String,
    pub color: MarkerColor,
}

/// Integrates sensor samples into marker motion.
///
/// Gyroscope samples add to velocity, accelerometer samples overwrite it,
/// and every tick moves the marker, damps velocity and bounces off the
/// bounds. The state is never reset; it outlives pause/resume cycles.
#[derive(Debug, Clone, Default)]
pub struct MotionIntegrator {
    state: MotionState,
    config: PhysicsConfig,
}

impl MotionIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            state: MotionState::default(),
            config,
        }
    }

    /// Start from an explicit state (tests, replays).
    pub fn from_state(state: MotionState, config: PhysicsConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn position(&self) -> MarkerPosition {
        MarkerPosition {
            x: self.state.position_x,
            y: self.state.position_y,
        }
    }

    /// Accumulate a rotation-rate sample directly into velocity.
    ///
    /// No scaling and no time weighting: each sample is an impulse.
    pub fn on_angular_rate_sample(&mut self, x: f32, y: f32, z: f32) -> AngularRateReadout {
        self.state.velocity_x += x;
        self.state.velocity_y += y;

        AngularRateReadout {
            text: gyroscope_text(x, y, z),
            color: MarkerColor::from_angular_rate_z(z, self.config.red_channel),
        }
    }

    /// Overwrite velocity from device tilt. `z` is ignored.
    ///
    /// The X axis is inverted so tilting the device right moves the marker right.
    pub fn on_acceleration_sample(&mut self, x: f32, y: f32, _z: f32) {
        let normalized_x = x / self.config.gravity;
        let normalized_y = y / self.config.gravity;

        self.state.velocity_x = -normalized_x * self.config.max_velocity;
        self.state.velocity_y = normalized_y * self.config.max_velocity;
    }

    /// Advance one fixed step against the given bounds.
    pub fn tick(&mut self, bounds: &Bounds) -> TickOutcome {
        let s = &mut self.state;

        s.position_x += s.velocity_x;
        s.position_y += s.velocity_y;

        s.velocity_x *= self.config.friction;
        s.velocity_y *= self.config.friction;

        let bounced_x = reflect_axis(
            &mut s.position_x,
            &mut s.velocity_x,
            bounds.min_x,
            bounds.max_x,
            self.config.bounce,
        );
        let bounced_y = reflect_axis(
            &mut s.position_y,
            &mut s.velocity_y,
            bounds.min_y,
            bounds.max_y,
            self.config.bounce,
        );

        if bounced_x || bounced_y {
            tracing::trace!(
                x = s.position_x,
                y = s.position_y,
                bounced_x,
                bounced_y,
                "Marker bounced"
            );
        }

        TickOutcome {
            position: MarkerPosition {
                x: s.position_x,
                y: s.position_y,
            },
            bounced_x,
            bounced_y,
        }
    }
}

/// Clamp one axis and reflect its velocity when the bound was exceeded.
///
/// Sitting exactly on a bound is not a hit. The lower bound is checked first,
/// so degenerate bounds (max < min) resolve to `min` without panicking.
fn reflect_axis(position: &mut f32, velocity: &mut f32, min: f32, max: f32, bounce: f32) -> bool {
    if *position < min {
        *position = min;
        *velocity = -*velocity * bounce;
        true
    } else if *position > max {
        *position = max;
        *velocity = -*velocity * bounce;
        true
    } else {
        false
    }
}
