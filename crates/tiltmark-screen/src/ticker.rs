use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tiltmark_core::event::ScreenEvent;

/// Sender half of the screen's event queue.
pub type EventSender = mpsc::UnboundedSender<ScreenEvent>;

struct Running {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Fixed-rate `Tick` producer with explicit start/stop.
///
/// The first tick fires immediately after `start`. Must be started from
/// inside a tokio runtime.
#[derive(Default)]
pub struct RepeatingTask {
    running: Option<Running>,
}

impl RepeatingTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the task. Returns `false` (and changes nothing) if already armed.
    pub fn start(&mut self, period: Duration, events: EventSender) -> bool {
        if self.is_running() {
            return false;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run_ticks(period, events, stop_rx));
        self.running = Some(Running { stop_tx, handle });
        tracing::debug!(period_ms = period.as_millis() as u64, "Tick task started");
        true
    }

    /// Disarm the task. Returns `false` if it was not armed.
    ///
    /// Ticks already queued are not recalled.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };
        // The task may already have exited on its own (queue closed).
        let _ = running.stop_tx.send(());
        drop(running.handle);
        tracing::debug!("Tick task stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(period: Duration, events: EventSender, mut stop_rx: oneshot::Receiver<()>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                if events.send(ScreenEvent::Tick).is_err() {
                    tracing::debug!("Event queue closed, tick task exiting");
                    break;
                }
            }
        }
    }
}
