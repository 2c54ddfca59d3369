//! Boundary traits for stream acquisition, rendering and time.

use crate::frame::Frame;
use crate::{CameraResult, CameraSettings, Size};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Negotiated stream parameters reported by a connected source.
#[derive(Debug, Clone)]
pub struct TrackInfo {
    /// Format granted by the driver; the requested size is only a hint
    pub format: Size,
    /// Device identity, for logging
    pub device: String,
}

/// Sink receiving decoded frames from the pump loop
pub type FrameSink = Box<dyn FnMut(Frame) + Send>;

/// Acquisition side of the capture boundary.
///
/// `connect` performs device selection and format negotiation, so
/// acquisition failures surface before any thread is spawned. `stream` is
/// the blocking pump loop, run on the track thread until `running` clears.
pub trait VideoSource: Send + 'static {
    fn connect(&mut self, settings: &CameraSettings) -> CameraResult<TrackInfo>;

    fn stream(&mut self, sink: FrameSink, running: Arc<AtomicBool>) -> CameraResult<()>;
}

/// Rendering side of the capture boundary.
///
/// Mirrors a live preview widget: an assignable frame source, play/pause
/// control, and dimensions that read as zero until frames arrive.
pub trait RenderSurface {
    /// Deliver the next live frame. Ignored while paused.
    fn present(&mut self, frame: Frame);

    fn play(&mut self);

    fn pause(&mut self);

    /// Drop the assigned frame source; size reads as unknown afterwards.
    fn detach(&mut self);

    /// Size of the last presented frame, `Size::UNKNOWN` before any frame.
    fn frame_size(&self) -> Size;

    /// Last presented frame, if any
    fn frame(&self) -> Option<&Frame>;
}

/// Sleep abstraction so the resolution-polling retry in `open` is testable
/// without real waiting.
pub trait Clock: Send {
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
