use serde::{Deserialize, Serialize};

/// Fixed green channel of the marker tint.
pub const MARKER_GREEN: u8 = 64;
/// Fixed blue channel of the marker tint.
pub const MARKER_BLUE: u8 = 129;

/// How an out-of-range red channel is brought back into 0..=255.
///
/// `|z| * 255 / π` exceeds 255 whenever the z rotation rate is above π rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedChannelPolicy {
    /// Saturate at 255.
    #[default]
    Clamp,
    /// Truncate toward zero and keep the low 8 bits.
    Wrap,
}

impl RedChannelPolicy {
    /// Parse a policy name (case-insensitive). Used for env overrides.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "clamp" => Some(Self::Clamp),
            "wrap" => Some(Self::Wrap),
            _ => None,
        }
    }

    /// Reduce a raw (non-negative) channel value to a byte.
    pub fn apply(self, raw: f32) -> u8 {
        if raw.is_nan() {
            return 0;
        }
        match self {
            Self::Clamp => raw.clamp(0.0, 255.0) as u8,
            // `as u32` saturates for huge values; masking keeps the low byte.
            Self::Wrap => ((raw as u32) & 0xFF) as u8,
        }
    }
}

/// Marker tint, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for MarkerColor {
    fn default() -> Self {
        Self {
            r: 0,
            g: MARKER_GREEN,
            b: MARKER_BLUE,
        }
    }
}

impl MarkerColor {
    /// Derive the tint from the z-axis rotation rate.
    pub fn from_angular_rate_z(z: f32, policy: RedChannelPolicy) -> Self {
        let raw = z.abs() * 255.0 / std::f32::consts::PI;
        Self {
            r: policy.apply(raw),
            g: MARKER_GREEN,
            b: MARKER_BLUE,
        }
    }

    /// Packed `0xRRGGBB` value for render sinks that take a single integer.
    pub fn packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl std::fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.packed())
    }
}
