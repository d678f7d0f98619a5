use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tiltmark_core::event::ScreenEvent;
use tiltmark_core::physics::STANDARD_GRAVITY;
use tiltmark_core::readout::unavailable_text;
use tiltmark_core::sample::{Accuracy, SensorKind, SensorSample};

use crate::ticker::EventSender;

/// A producer of samples for one sensor.
///
/// Implementations hand samples to the screen only through the sender they
/// were subscribed with; they never touch integrator state.
pub trait SensorFeed: Send {
    fn kind(&self) -> SensorKind;

    /// Start delivering samples. Subscribing twice must not double delivery.
    fn subscribe(&mut self, events: EventSender);

    /// Stop delivering samples. A no-op when not subscribed.
    fn unsubscribe(&mut self);

    fn is_subscribed(&self) -> bool;
}

/// The screen's sensor feeds. A missing feed means the platform has no such
/// sensor; it is reported once and never subscribed.
#[derive(Default)]
pub struct SensorHub {
    gyroscope: Option<Box<dyn SensorFeed>>,
    accelerometer: Option<Box<dyn SensorFeed>>,
}

impl SensorHub {
    pub fn new(
        gyroscope: Option<Box<dyn SensorFeed>>,
        accelerometer: Option<Box<dyn SensorFeed>>,
    ) -> Self {
        Self {
            gyroscope,
            accelerometer,
        }
    }

    /// Hub with neither sensor present.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_available(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Gyroscope => self.gyroscope.is_some(),
            SensorKind::Accelerometer => self.accelerometer.is_some(),
        }
    }

    /// Messages for every missing feed, gyroscope first.
    pub fn unavailability_messages(&self) -> Vec<String> {
        [SensorKind::Gyroscope, SensorKind::Accelerometer]
            .into_iter()
            .filter(|&kind| !self.is_available(kind))
            .map(unavailable_text)
            .collect()
    }

    pub fn subscribe_all(&mut self, events: &EventSender) {
        for feed in self.feeds_mut() {
            if !feed.is_subscribed() {
                feed.subscribe(events.clone());
                tracing::debug!(sensor = %feed.kind(), "Subscribed to sensor feed");
            }
        }
    }

    pub fn unsubscribe_all(&mut self) {
        for feed in self.feeds_mut() {
            if feed.is_subscribed() {
                feed.unsubscribe();
                tracing::debug!(sensor = %feed.kind(), "Unsubscribed from sensor feed");
            }
        }
    }

    fn feeds_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn SensorFeed>> {
        self.gyroscope
            .iter_mut()
            .chain(self.accelerometer.iter_mut())
    }
}

/// Synthetic sample shape parameters for a `SimulatedFeed`.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    /// Delay between samples ("normal" platform rate is 200 ms).
    pub period: Duration,
    /// Uniform noise added to every axis.
    pub jitter: f32,
    /// Seed for the noise generator, so runs are reproducible.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(200),
            jitter: 0.05,
            seed: 7,
        }
    }
}

struct FeedTask {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Feed that synthesizes slow sinusoidal motion for headless runs.
///
/// The gyroscope variant also reports `Accuracy::High` on every subscribe,
/// as mobile platforms typically do when a listener registers.
pub struct SimulatedFeed {
    kind: SensorKind,
    params: SimulationParams,
    /// Next sample index, shared with the running task so the waveform
    /// resumes where it left off after a pause.
    step: Arc<AtomicU64>,
    task: Option<FeedTask>,
}

impl SimulatedFeed {
    pub fn new(kind: SensorKind, params: SimulationParams) -> Self {
        Self {
            kind,
            params,
            step: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn gyroscope(params: SimulationParams) -> Self {
        Self::new(SensorKind::Gyroscope, params)
    }

    pub fn accelerometer(params: SimulationParams) -> Self {
        Self::new(SensorKind::Accelerometer, params)
    }
}

impl SensorFeed for SimulatedFeed {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn subscribe(&mut self, events: EventSender) {
        if self.is_subscribed() {
            return;
        }
        if self.kind == SensorKind::Gyroscope {
            let _ = events.send(ScreenEvent::AccuracyChanged {
                sensor: self.kind,
                accuracy: Accuracy::High,
            });
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        // Distinct noise per subscription, still reproducible from the seed.
        let seed = self.params.seed ^ self.step.load(Ordering::Relaxed).rotate_left(17);
        let handle = tokio::spawn(run_feed(
            self.kind,
            self.params,
            Arc::clone(&self.step),
            seed,
            events,
            stop_rx,
        ));
        self.task = Some(FeedTask { stop_tx, handle });
    }

    fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.stop_tx.send(());
            drop(task.handle);
        }
    }

    fn is_subscribed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }
}

impl Drop for SimulatedFeed {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Noise-free waveform value for a sensor at sample `step`.
pub fn waveform(kind: SensorKind, step: u64, period: Duration) -> (f32, f32, f32) {
    let t = step as f32 * period.as_secs_f32();
    match kind {
        SensorKind::Gyroscope => (
            0.3 * t.sin(),
            0.3 * (0.7 * t).cos(),
            4.0 * (0.25 * t).sin(),
        ),
        SensorKind::Accelerometer => (
            0.3 * STANDARD_GRAVITY * (0.2 * t).sin(),
            0.2 * STANDARD_GRAVITY * (0.15 * t).cos(),
            STANDARD_GRAVITY,
        ),
    }
}

async fn run_feed(
    kind: SensorKind,
    params: SimulationParams,
    step: Arc<AtomicU64>,
    seed: u64,
    events: EventSender,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut interval = tokio::time::interval(params.period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let period_ns = params.period.as_nanos() as u64;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                let n = step.load(Ordering::Relaxed);
                let (x, y, z) = waveform(kind, n, params.period);
                let mut noise = || {
                    if params.jitter > 0.0 {
                        rng.random_range(-params.jitter..=params.jitter)
                    } else {
                        0.0
                    }
                };
                let sample = SensorSample::new(
                    x + noise(),
                    y + noise(),
                    z + noise(),
                    n.saturating_mul(period_ns),
                );
                if events.send(ScreenEvent::sample(kind, sample)).is_err() {
                    tracing::debug!(sensor = %kind, "Event queue closed, feed exiting");
                    break;
                }
                step.store(n + 1, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn fast_params() -> SimulationParams {
        SimulationParams {
            period: Duration::from_millis(2),
            jitter: 0.0,
            seed: 1,
        }
    }

    #[test]
    fn missing_feeds_report_in_order() {
        let hub = SensorHub::empty();
        assert_eq!(
            hub.unavailability_messages(),
            vec![
                "Gyroscope sensor not available".to_string(),
                "Accelerometer sensor not available".to_string(),
            ]
        );
    }

    #[test]
    fn present_feeds_report_nothing() {
        let hub = SensorHub::new(
            Some(Box::new(SimulatedFeed::gyroscope(fast_params()))),
            Some(Box::new(SimulatedFeed::accelerometer(fast_params()))),
        );
        assert!(hub.unavailability_messages().is_empty());
        assert!(hub.is_available(SensorKind::Gyroscope));
        assert!(hub.is_available(SensorKind::Accelerometer));
    }

    #[test]
    fn waveform_starts_level() {
        let (x, y, z) = waveform(SensorKind::Accelerometer, 0, Duration::from_millis(200));
        assert_eq!(x, 0.0);
        assert!(y > 0.0);
        assert_eq!(z, STANDARD_GRAVITY);
        let (_, _, gz) = waveform(SensorKind::Gyroscope, 0, Duration::from_millis(200));
        assert_eq!(gz, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn waveform_stays_in_plausible_range(step in 0u64..1_000_000, period_ms in 1u64..1000) {
                let period = Duration::from_millis(period_ms);

                let (x, y, z) = waveform(SensorKind::Gyroscope, step, period);
                prop_assert!(x.abs() <= 0.3 && y.abs() <= 0.3 && z.abs() <= 4.0);

                let (x, y, z) = waveform(SensorKind::Accelerometer, step, period);
                prop_assert!(x.abs() <= 0.3 * STANDARD_GRAVITY + 1e-3);
                prop_assert!(y.abs() <= 0.2 * STANDARD_GRAVITY + 1e-3);
                prop_assert_eq!(z, STANDARD_GRAVITY);
            }
        }
    }

    #[tokio::test]
    async fn gyroscope_feed_reports_accuracy_then_samples() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut feed = SimulatedFeed::gyroscope(fast_params());
        feed.subscribe(tx);
        assert!(feed.is_subscribed());

        assert_eq!(
            rx.recv().await,
            Some(ScreenEvent::AccuracyChanged {
                sensor: SensorKind::Gyroscope,
                accuracy: Accuracy::High,
            })
        );
        match rx.recv().await {
            Some(ScreenEvent::AngularRate(sample)) => assert_eq!(sample.timestamp_ns, 0),
            other => panic!("expected angular rate sample, got {other:?}"),
        }

        feed.unsubscribe();
        assert!(!feed.is_subscribed());
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn accelerometer_feed_emits_acceleration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut feed = SimulatedFeed::accelerometer(fast_params());
        feed.subscribe(tx.clone());
        feed.subscribe(tx);

        let first = rx.recv().await;
        assert!(matches!(first, Some(ScreenEvent::Acceleration(_))));
        feed.unsubscribe();
    }

    #[tokio::test]
    async fn hub_subscribes_only_present_feeds() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut hub = SensorHub::new(
            None,
            Some(Box::new(SimulatedFeed::accelerometer(fast_params()))),
        );
        hub.subscribe_all(&tx);
        drop(tx);

        for _ in 0..5 {
            let event = rx.recv().await.expect("event");
            assert!(
                matches!(event, ScreenEvent::Acceleration(_)),
                "only accelerometer events expected, got {event:?}"
            );
        }

        hub.unsubscribe_all();
        while rx.recv().await.is_some() {}
    }
}
