use serde::{Deserialize, Serialize};

/// Which platform sensor produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Angular velocity about three axes (rad/s).
    Gyroscope,
    /// Linear acceleration about three axes, gravity included (m/s²).
    Accelerometer,
}

impl SensorKind {
    /// Human-readable sensor name used in readout text.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gyroscope => "Gyroscope",
            Self::Accelerometer => "Accelerometer",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gyroscope => write!(f, "gyroscope"),
            Self::Accelerometer => write!(f, "accelerometer"),
        }
    }
}

/// A single three-axis reading from one sensor feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Monotonic timestamp from the producer. Carried, never interpreted.
    pub timestamp_ns: u64,
}

impl SensorSample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ns: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ns,
        }
    }

    /// Sample with a zero timestamp, for callers that have no clock.
    pub fn untimed(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0)
    }
}

/// Reported accuracy of a sensor feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    High,
    Medium,
    Low,
    Unreliable,
    #[default]
    Unknown,
}

impl Accuracy {
    /// Map a platform status code to an accuracy level.
    ///
    /// Codes follow the common mobile convention: 3 = high, 2 = medium,
    /// 1 = low, 0 = unreliable. Anything else (including "no contact", -1)
    /// is unknown.
    pub fn from_status_code(code: i32) -> Self {
        match code {
            3 => Self::High,
            2 => Self::Medium,
            1 => Self::Low,
            0 => Self::Unreliable,
            _ => Self::Unknown,
        }
    }

    /// Fixed readout text for a gyroscope accuracy change.
    pub fn message(self) -> &'static str {
        match self {
            Self::High => "Gyroscope accuracy is high",
            Self::Medium => "Gyroscope accuracy is medium",
            Self::Low => "Gyroscope accuracy is low",
            Self::Unreliable => "Gyroscope accuracy is unreliable",
            Self::Unknown => "Gyroscope accuracy is unknown",
        }
    }
}
