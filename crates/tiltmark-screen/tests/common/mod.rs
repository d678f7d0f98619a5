use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tiltmark_core::config::PhysicsConfig;
use tiltmark_core::event::ScreenEvent;
use tiltmark_core::physics::ContainerGeometry;
use tiltmark_core::sample::{SensorKind, SensorSample};

use tiltmark_screen::feeds::{SensorFeed, SensorHub};
use tiltmark_screen::screen::{ScreenController, ScreenHandle};
use tiltmark_screen::sinks::{GeometrySource, MemorySurface, Surfaces};
use tiltmark_screen::ticker::EventSender;

/// Shared record of what the screen did to a `ScriptedFeed`.
#[derive(Default)]
struct FeedState {
    subscribes: usize,
    unsubscribes: usize,
    sender: Option<EventSender>,
}

/// Test-side view of a `ScriptedFeed`: counts subscriptions and pushes
/// samples only while the screen is subscribed.
#[derive(Clone)]
pub struct FeedProbe {
    kind: SensorKind,
    state: Arc<Mutex<FeedState>>,
}

impl FeedProbe {
    pub fn subscribes(&self) -> usize {
        self.lock().subscribes
    }

    pub fn unsubscribes(&self) -> usize {
        self.lock().unsubscribes
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().sender.is_some()
    }

    /// Deliver a sample. Returns `false` when the feed is not subscribed.
    pub fn emit(&self, sample: SensorSample) -> bool {
        match &self.lock().sender {
            Some(tx) => tx.send(ScreenEvent::sample(self.kind, sample)).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Feed driven entirely by the test through its `FeedProbe`.
pub struct ScriptedFeed {
    probe: FeedProbe,
}

impl ScriptedFeed {
    pub fn new(kind: SensorKind) -> (Self, FeedProbe) {
        let probe = FeedProbe {
            kind,
            state: Arc::new(Mutex::new(FeedState::default())),
        };
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl SensorFeed for ScriptedFeed {
    fn kind(&self) -> SensorKind {
        self.probe.kind
    }

    fn subscribe(&mut self, events: EventSender) {
        let mut state = self.probe.lock();
        state.subscribes += 1;
        state.sender = Some(events);
    }

    fn unsubscribe(&mut self) {
        let mut state = self.probe.lock();
        if state.sender.take().is_some() {
            state.unsubscribes += 1;
        }
    }

    fn is_subscribed(&self) -> bool {
        self.probe.is_subscribed()
    }
}

/// A screen running on a spawned task with both sensors scripted.
pub struct TestScreen {
    pub handle: ScreenHandle,
    pub surface: MemorySurface,
    pub gyroscope: FeedProbe,
    pub accelerometer: FeedProbe,
    pub task: tokio::task::JoinHandle<tiltmark_screen::screen::ScreenReport>,
}

impl TestScreen {
    pub fn spawn(config: PhysicsConfig, geometry: impl GeometrySource + 'static) -> Self {
        let (gyro_feed, gyroscope) = ScriptedFeed::new(SensorKind::Gyroscope);
        let (accel_feed, accelerometer) = ScriptedFeed::new(SensorKind::Accelerometer);
        let hub = SensorHub::new(Some(Box::new(gyro_feed)), Some(Box::new(accel_feed)));

        let surface = MemorySurface::new();
        let surfaces = Surfaces::new(surface.clone(), surface.clone(), geometry);
        let (controller, handle) = ScreenController::new(config, hub, surfaces);
        let task = tokio::spawn(controller.run());

        Self {
            handle,
            surface,
            gyroscope,
            accelerometer,
            task,
        }
    }
}

/// Physics defaults with a tick period that never fires during a test
/// (apart from the immediate first tick).
pub fn idle_config() -> PhysicsConfig {
    PhysicsConfig {
        tick_interval_ms: 60_000,
        ..PhysicsConfig::default()
    }
}

pub fn fast_config(tick_ms: u64) -> PhysicsConfig {
    PhysicsConfig {
        tick_interval_ms: tick_ms,
        ..PhysicsConfig::default()
    }
}

/// Bounds of (-10, 10) on both axes.
pub fn small_container() -> ContainerGeometry {
    ContainerGeometry {
        container_width: 20.0,
        container_height: 20.0,
        marker_width: 20.0,
        marker_height: 20.0,
    }
}

/// Poll `cond` every few milliseconds, panicking after two seconds.
pub async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
