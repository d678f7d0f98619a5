use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use tiltmark_core::color::RedChannelPolicy;
use tiltmark_core::config::PhysicsConfig;
use tiltmark_core::physics::ContainerGeometry;

use crate::error::ScreenError;
use crate::feeds::SimulationParams;

const DEFAULT_CONFIG_PATH: &str = "tiltmark.toml";

/// Top-level runtime configuration, loaded from `tiltmark.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub physics: PhysicsConfig,
    pub geometry: GeometryConfig,
    pub feeds: FeedsConfig,
    /// Stop after this many seconds. Runs until Ctrl-C when unset.
    pub run_for_secs: Option<u64>,
    /// Log every Nth marker frame at debug level.
    pub render_log_every: u64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            geometry: GeometryConfig::default(),
            feeds: FeedsConfig::default(),
            run_for_secs: None,
            render_log_every: 60,
        }
    }
}

/// Container and marker dimensions for the headless surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub container_width: f32,
    pub container_height: f32,
    pub marker_width: f32,
    pub marker_height: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            container_width: 1080.0,
            container_height: 1920.0,
            marker_width: 100.0,
            marker_height: 100.0,
        }
    }
}

impl GeometryConfig {
    pub fn to_geometry(&self) -> ContainerGeometry {
        ContainerGeometry {
            container_width: self.container_width,
            container_height: self.container_height,
            marker_width: self.marker_width,
            marker_height: self.marker_height,
        }
    }
}

/// Which simulated sensors exist and how they sample.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// When false the gyroscope is treated as missing on this device.
    pub gyroscope: bool,
    pub accelerometer: bool,
    pub sample_period_ms: u64,
    pub jitter: f32,
    pub seed: u64,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            gyroscope: true,
            accelerometer: true,
            sample_period_ms: 200,
            jitter: 0.05,
            seed: 7,
        }
    }
}

impl FeedsConfig {
    pub fn to_params(&self) -> SimulationParams {
        SimulationParams {
            period: Duration::from_millis(self.sample_period_ms),
            jitter: self.jitter,
            seed: self.seed,
        }
    }
}

impl ScreenConfig {
    /// Reject configs the runtime cannot honor.
    pub fn validate(&self) -> Result<(), ScreenError> {
        self.physics.validate()?;

        let g = &self.geometry;
        for (name, value) in [
            ("geometry.container_width", g.container_width),
            ("geometry.container_height", g.container_height),
            ("geometry.marker_width", g.marker_width),
            ("geometry.marker_height", g.marker_height),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ScreenError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative size, got {value}"
                )));
            }
        }
        if g.marker_width > g.container_width || g.marker_height > g.container_height {
            tracing::warn!("Marker is larger than its container; it will bounce every tick");
        }

        if self.feeds.sample_period_ms == 0 {
            return Err(ScreenError::InvalidConfig(
                "feeds.sample_period_ms must be > 0".to_string(),
            ));
        }
        if !(self.feeds.jitter >= 0.0 && self.feeds.jitter.is_finite()) {
            return Err(ScreenError::InvalidConfig(format!(
                "feeds.jitter must be >= 0, got {}",
                self.feeds.jitter
            )));
        }
        if self.run_for_secs == Some(0) {
            return Err(ScreenError::InvalidConfig(
                "run_for_secs must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from `TILTMARK_CONFIG` (or `tiltmark.toml`) if it exists,
    /// then apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("TILTMARK_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ScreenConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    ScreenConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {} found, using defaults", path.display());
                ScreenConfig::default()
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `TILTMARK_*` overrides read through `lookup`. Empty or
    /// unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(val) = get("TILTMARK_TICK_INTERVAL_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            self.physics.tick_interval_ms = ms;
        }
        if let Some(val) = get("TILTMARK_RED_CHANNEL") {
            match RedChannelPolicy::parse(&val) {
                Some(policy) => self.physics.red_channel = policy,
                None => tracing::warn!(value = %val, "Unknown TILTMARK_RED_CHANNEL, ignoring"),
            }
        }
        if let Some(val) = get("TILTMARK_DISABLE_GYROSCOPE")
            && is_truthy(&val)
        {
            self.feeds.gyroscope = false;
        }
        if let Some(val) = get("TILTMARK_DISABLE_ACCELEROMETER")
            && is_truthy(&val)
        {
            self.feeds.accelerometer = false;
        }
        if let Some(val) = get("TILTMARK_RUN_FOR_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            self.run_for_secs = Some(secs);
        }
    }

    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_secs.map(Duration::from_secs)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = ScreenConfig::default();
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.geometry.container_width, 1080.0);
        assert_eq!(cfg.geometry.marker_height, 100.0);
        assert!(cfg.feeds.gyroscope);
        assert!(cfg.feeds.accelerometer);
        assert_eq!(cfg.feeds.sample_period_ms, 200);
        assert!(cfg.run_for_secs.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
run_for_secs = 5

[physics]
friction = 0.95
"#;
        let cfg: ScreenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.run_for(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.physics.friction, 0.95);
        assert_eq!(cfg.physics.bounce, 0.8);
        assert_eq!(cfg.render_log_every, 60);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
run_for_secs = 30
render_log_every = 10

[physics]
friction = 0.9
bounce = 0.5
max_velocity = 12.0
gravity = 9.81
tick_interval_ms = 20
red_channel = "wrap"

[geometry]
container_width = 800.0
container_height = 600.0
marker_width = 50.0
marker_height = 40.0

[feeds]
gyroscope = false
accelerometer = true
sample_period_ms = 50
jitter = 0.0
seed = 42
"#;
        let cfg: ScreenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.physics.red_channel, RedChannelPolicy::Wrap);
        assert_eq!(cfg.physics.tick_interval_ms, 20);
        let geometry = cfg.geometry.to_geometry();
        assert_eq!(geometry.container_width, 800.0);
        assert_eq!(geometry.marker_height, 40.0);
        assert!(!cfg.feeds.gyroscope);
        let params = cfg.feeds.to_params();
        assert_eq!(params.period, Duration::from_millis(50));
        assert_eq!(params.seed, 42);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overrides_apply_over_file_values() {
        let mut cfg = ScreenConfig::default();
        cfg.apply_overrides(env(&[
            ("TILTMARK_TICK_INTERVAL_MS", "33"),
            ("TILTMARK_RED_CHANNEL", "wrap"),
            ("TILTMARK_DISABLE_GYROSCOPE", "true"),
            ("TILTMARK_RUN_FOR_SECS", "3"),
        ]));
        assert_eq!(cfg.physics.tick_interval_ms, 33);
        assert_eq!(cfg.physics.red_channel, RedChannelPolicy::Wrap);
        assert!(!cfg.feeds.gyroscope);
        assert!(cfg.feeds.accelerometer);
        assert_eq!(cfg.run_for_secs, Some(3));
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let mut cfg = ScreenConfig::default();
        cfg.apply_overrides(env(&[
            ("TILTMARK_TICK_INTERVAL_MS", "fast"),
            ("TILTMARK_RED_CHANNEL", "purple"),
            ("TILTMARK_DISABLE_ACCELEROMETER", "no"),
            ("TILTMARK_RUN_FOR_SECS", ""),
        ]));
        assert_eq!(cfg.physics.tick_interval_ms, 16);
        assert_eq!(cfg.physics.red_channel, RedChannelPolicy::Clamp);
        assert!(cfg.feeds.accelerometer);
        assert!(cfg.run_for_secs.is_none());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = ScreenConfig {
            physics: PhysicsConfig {
                friction: 2.0,
                ..PhysicsConfig::default()
            },
            ..ScreenConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ScreenError::InvalidConfig(_))));

        let mut cfg = ScreenConfig::default();
        cfg.geometry.container_width = f32::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = ScreenConfig::default();
        cfg.feeds.sample_period_ms = 0;
        assert!(cfg.validate().is_err());

        let cfg = ScreenConfig {
            run_for_secs: Some(0),
            ..ScreenConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
