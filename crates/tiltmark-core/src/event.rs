use crate::sample::{Accuracy, SensorKind, SensorSample};

/// Everything the screen reacts to, delivered through one ordered queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// Gyroscope sample.
    AngularRate(SensorSample),
    /// Accelerometer sample.
    Acceleration(SensorSample),
    AccuracyChanged {
        sensor: SensorKind,
        accuracy: Accuracy,
    },
    /// Fixed-rate timer fired.
    Tick,
    Pause,
    Resume,
    Close,
}

impl ScreenEvent {
    /// Wrap a sample in the event matching its sensor.
    pub fn sample(kind: SensorKind, sample: SensorSample) -> Self {
        match kind {
            SensorKind::Gyroscope => Self::AngularRate(sample),
            SensorKind::Accelerometer => Self::Acceleration(sample),
        }
    }

    /// Events that only make sense while the screen is active.
    pub fn requires_active(&self) -> bool {
        matches!(
            self,
            Self::AngularRate(_) | Self::Acceleration(_) | Self::AccuracyChanged { .. } | Self::Tick
        )
    }

    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AngularRate(_) => "angular_rate",
            Self::Acceleration(_) => "acceleration",
            Self::AccuracyChanged { .. } => "accuracy_changed",
            Self::Tick => "tick",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Close => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_routes_by_kind() {
        let s = SensorSample::untimed(1.0, 2.0, 3.0);
        assert_eq!(
            ScreenEvent::sample(SensorKind::Gyroscope, s),
            ScreenEvent::AngularRate(s)
        );
        assert_eq!(
            ScreenEvent::sample(SensorKind::Accelerometer, s),
            ScreenEvent::Acceleration(s)
        );
    }

    #[test]
    fn lifecycle_events_never_require_active() {
        assert!(!ScreenEvent::Pause.requires_active());
        assert!(!ScreenEvent::Resume.requires_active());
        assert!(!ScreenEvent::Close.requires_active());
        assert!(ScreenEvent::Tick.requires_active());
        assert_eq!(ScreenEvent::Tick.label(), "tick");
    }
}
