use crate::sample::SensorKind;

/// Readout text for a gyroscope sample.
///
/// Floats use Rust's shortest round-trip formatting with a trailing `.0`
/// for whole numbers (`1.0`, `-0.25`).
pub fn gyroscope_text(x: f32, y: f32, z: f32) -> String {
    format!("Gyroscope Data:\nx: {x:?}\ny: {y:?}\nz: {z:?}")
}

/// Readout text shown in place of live data when a feed is missing.
pub fn unavailable_text(kind: SensorKind) -> String {
    format!("{} sensor not available", kind.display_name())
}
