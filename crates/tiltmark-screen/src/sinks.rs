use std::sync::{Arc, Mutex, PoisonError};

use tiltmark_core::color::MarkerColor;
use tiltmark_core::physics::{ContainerGeometry, MarkerPosition};

/// Consumes marker translations and tints.
pub trait RenderSink: Send {
    fn translate(&mut self, position: MarkerPosition);
    fn tint(&mut self, color: MarkerColor);
}

/// Consumes the diagnostic readout text.
pub trait TextSink: Send {
    fn set_text(&mut self, text: &str);
}

/// Reports current container and marker dimensions. Queried once per tick.
pub trait GeometrySource: Send {
    fn geometry(&self) -> ContainerGeometry;
}

/// The three collaborators a screen renders through.
pub struct Surfaces {
    pub render: Box<dyn RenderSink>,
    pub text: Box<dyn TextSink>,
    pub geometry: Box<dyn GeometrySource>,
}

impl Surfaces {
    pub fn new(
        render: impl RenderSink + 'static,
        text: impl TextSink + 'static,
        geometry: impl GeometrySource + 'static,
    ) -> Self {
        Self {
            render: Box::new(render),
            text: Box::new(text),
            geometry: Box::new(geometry),
        }
    }
}

/// Geometry that never changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeometry(pub ContainerGeometry);

impl GeometrySource for FixedGeometry {
    fn geometry(&self) -> ContainerGeometry {
        self.0
    }
}

/// Geometry that another owner can change between ticks (e.g. on rotation).
#[derive(Debug, Clone)]
pub struct SharedGeometry {
    inner: Arc<Mutex<ContainerGeometry>>,
}

impl SharedGeometry {
    pub fn new(geometry: ContainerGeometry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(geometry)),
        }
    }

    pub fn set(&self, geometry: ContainerGeometry) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = geometry;
    }
}

impl GeometrySource for SharedGeometry {
    fn geometry(&self) -> ContainerGeometry {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Render sink that logs every `every`th translation at debug level.
pub struct LogRenderSink {
    every: u64,
    frames: u64,
}

impl LogRenderSink {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }
}

impl RenderSink for LogRenderSink {
    fn translate(&mut self, position: MarkerPosition) {
        self.frames += 1;
        if self.frames % self.every == 0 {
            tracing::debug!(frame = self.frames, x = position.x, y = position.y, "Marker moved");
        }
    }

    fn tint(&mut self, color: MarkerColor) {
        tracing::debug!(color = %color, "Marker tinted");
    }
}

/// Text sink that logs each readout change at info level.
#[derive(Default)]
pub struct LogTextSink {
    last: String,
}

impl TextSink for LogTextSink {
    fn set_text(&mut self, text: &str) {
        if self.last != text {
            tracing::info!(readout = %text.replace('\n', " | "), "Readout updated");
            self.last.clear();
            self.last.push_str(text);
        }
    }
}

/// Everything an in-memory surface has received, in order.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    pub positions: Vec<MarkerPosition>,
    pub colors: Vec<MarkerColor>,
    pub texts: Vec<String>,
}

/// Render + text sink that records into shared memory. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> SurfaceLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .texts
            .last()
            .cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .positions
            .len()
    }
}

impl RenderSink for MemorySurface {
    fn translate(&mut self, position: MarkerPosition) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .positions
            .push(position);
    }

    fn tint(&mut self, color: MarkerColor) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .colors
            .push(color);
    }
}

impl TextSink for MemorySurface {
    fn set_text(&mut self, text: &str) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .texts
            .push(text.to_string());
    }
}
