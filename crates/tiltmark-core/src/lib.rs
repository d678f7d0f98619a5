pub mod color;
pub mod config;
pub mod event;
pub mod physics;
pub mod readout;
pub mod sample;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::physics::{Bounds, ContainerGeometry, MotionIntegrator, TickOutcome};
    use crate::sample::SensorSample;

    /// A portrait phone-sized container with a 100x100 marker.
    pub fn phone_geometry() -> ContainerGeometry {
        ContainerGeometry {
            container_width: 1080.0,
            container_height: 1920.0,
            marker_width: 100.0,
            marker_height: 100.0,
        }
    }

    /// Symmetric bounds of ±`half_extent` on both axes.
    pub fn square_bounds(half_extent: f32) -> Bounds {
        Bounds::new(-half_extent, half_extent, -half_extent, half_extent)
    }

    /// Accelerometer reading for a device tilted `fraction` of 1 g along X.
    pub fn tilt_x(fraction: f32) -> SensorSample {
        SensorSample::untimed(fraction * crate::physics::STANDARD_GRAVITY, 0.0, 0.0)
    }

    /// Run `n` ticks against fixed bounds, returning every outcome.
    pub fn run_ticks(integrator: &mut MotionIntegrator, bounds: &Bounds, n: usize) -> Vec<TickOutcome> {
        (0..n).map(|_| integrator.tick(bounds)).collect()
    }

    /// Assert two floats agree to within `eps`.
    pub fn assert_close(actual: f32, expected: f32, eps: f32) {
        assert!(
            (actual - expected).abs() <= eps,
            "expected {expected} ± {eps}, got {actual}"
        );
    }
}
