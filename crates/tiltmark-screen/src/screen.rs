use tokio::sync::mpsc;

use tiltmark_core::config::PhysicsConfig;
use tiltmark_core::event::ScreenEvent;
use tiltmark_core::physics::{Bounds, MotionIntegrator, MotionState};
use tiltmark_core::sample::{Accuracy, SensorKind, SensorSample};

use crate::error::ScreenError;
use crate::feeds::SensorHub;
use crate::sinks::Surfaces;
use crate::ticker::{EventSender, RepeatingTask};

/// Where a screen is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Active,
    Paused,
    Closed,
}

/// Cloneable handle for driving a running screen.
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    tx: EventSender,
}

impl ScreenHandle {
    /// Queue an event behind everything already queued.
    pub fn send(&self, event: ScreenEvent) -> Result<(), ScreenError> {
        self.tx.send(event).map_err(|_| ScreenError::Closed)
    }

    pub fn pause(&self) -> Result<(), ScreenError> {
        self.send(ScreenEvent::Pause)
    }

    pub fn resume(&self) -> Result<(), ScreenError> {
        self.send(ScreenEvent::Resume)
    }

    pub fn close(&self) -> Result<(), ScreenError> {
        self.send(ScreenEvent::Close)
    }

    /// Raw sender, for wiring in additional producers.
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Counters kept by the event loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenStats {
    pub ticks: u64,
    pub gyroscope_samples: u64,
    pub accelerometer_samples: u64,
    /// Ticks and samples that arrived while the screen was not active.
    pub dropped_while_paused: u64,
    pub bounces: u64,
}

/// Final state handed back when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenReport {
    pub state: MotionState,
    pub stats: ScreenStats,
}

/// Owns one integrator and applies queued events to it in arrival order.
///
/// Feeds and the ticker only send into the queue; every mutation of the
/// motion state happens inside [`ScreenController::run`].
pub struct ScreenController {
    integrator: MotionIntegrator,
    hub: SensorHub,
    ticker: RepeatingTask,
    surfaces: Surfaces,
    lifecycle: Lifecycle,
    stats: ScreenStats,
    rx: mpsc::UnboundedReceiver<ScreenEvent>,
    /// Weak so the queue closes once handles and producers are gone.
    tx: mpsc::WeakUnboundedSender<ScreenEvent>,
}

impl ScreenController {
    pub fn new(config: PhysicsConfig, hub: SensorHub, surfaces: Surfaces) -> (Self, ScreenHandle) {
        Self::with_integrator(MotionIntegrator::with_config(config), hub, surfaces)
    }

    /// Start from an existing integrator, e.g. one restored from a saved state.
    pub fn with_integrator(
        integrator: MotionIntegrator,
        hub: SensorHub,
        surfaces: Surfaces,
    ) -> (Self, ScreenHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            integrator,
            hub,
            ticker: RepeatingTask::new(),
            surfaces,
            lifecycle: Lifecycle::Created,
            stats: ScreenStats::default(),
            rx,
            tx: tx.downgrade(),
        };
        (controller, ScreenHandle { tx })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Run until `Close` arrives or every sender is dropped.
    pub async fn run(mut self) -> ScreenReport {
        self.create();

        while let Some(event) = self.rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }

        self.pause();
        self.lifecycle = Lifecycle::Closed;
        tracing::info!(
            ticks = self.stats.ticks,
            bounces = self.stats.bounces,
            dropped = self.stats.dropped_while_paused,
            "Screen closed"
        );

        ScreenReport {
            state: *self.integrator.state(),
            stats: self.stats,
        }
    }

    fn create(&mut self) {
        for message in self.hub.unavailability_messages() {
            tracing::warn!("{message}");
            self.surfaces.text.set_text(&message);
        }
        tracing::info!(
            tick_ms = self.integrator.config().tick_interval_ms,
            "Screen created"
        );
        self.resume();
    }

    /// Apply one event. Returns `false` when the loop should exit.
    fn handle_event(&mut self, event: ScreenEvent) -> bool {
        if event.requires_active() && self.lifecycle != Lifecycle::Active {
            self.stats.dropped_while_paused += 1;
            tracing::trace!(event = event.label(), "Dropped event while paused");
            return true;
        }

        match event {
            ScreenEvent::Tick => self.on_tick(),
            ScreenEvent::AngularRate(sample) => self.on_angular_rate(sample),
            ScreenEvent::Acceleration(sample) => {
                self.stats.accelerometer_samples += 1;
                self.integrator
                    .on_acceleration_sample(sample.x, sample.y, sample.z);
            },
            ScreenEvent::AccuracyChanged { sensor, accuracy } => {
                self.on_accuracy_changed(sensor, accuracy);
            },
            ScreenEvent::Pause => self.pause(),
            ScreenEvent::Resume => self.resume(),
            ScreenEvent::Close => return false,
        }
        true
    }

    fn on_tick(&mut self) {
        let geometry = self.surfaces.geometry.geometry();
        let bounds = Bounds::from_geometry(&geometry);
        let outcome = self.integrator.tick(&bounds);

        self.stats.ticks += 1;
        self.stats.bounces += u64::from(outcome.bounced_x) + u64::from(outcome.bounced_y);
        self.surfaces.render.translate(outcome.position);
    }

    fn on_angular_rate(&mut self, sample: SensorSample) {
        self.stats.gyroscope_samples += 1;
        let readout = self
            .integrator
            .on_angular_rate_sample(sample.x, sample.y, sample.z);
        self.surfaces.text.set_text(&readout.text);
        self.surfaces.render.tint(readout.color);
    }

    fn on_accuracy_changed(&mut self, sensor: SensorKind, accuracy: Accuracy) {
        match sensor {
            SensorKind::Gyroscope => self.surfaces.text.set_text(accuracy.message()),
            SensorKind::Accelerometer => {
                tracing::debug!(?accuracy, "Accelerometer accuracy changed");
            },
        }
    }

    fn resume(&mut self) {
        if self.lifecycle == Lifecycle::Active {
            return;
        }
        let Some(tx) = self.tx.upgrade() else {
            tracing::warn!("Event queue closed before resume");
            return;
        };

        self.hub.subscribe_all(&tx);
        self.ticker
            .start(self.integrator.config().tick_interval(), tx);
        self.lifecycle = Lifecycle::Active;
        tracing::info!("Screen resumed");
    }

    fn pause(&mut self) {
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        self.hub.unsubscribe_all();
        self.ticker.stop();
        self.lifecycle = Lifecycle::Paused;
        tracing::info!("Screen paused");
    }
}
