//! Mock source, surface and clock for testing without hardware.

use crate::frame::Frame;
use crate::traits::{Clock, FrameSink, RenderSurface, TrackInfo, VideoSource};
use crate::{CameraError, CameraResult, CameraSettings, Size};
use parking_lot::Mutex;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Frame pacing for the streaming mock
const FRAME_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Clone, Copy)]
enum MockBehavior {
    /// Connect succeeds but no frames are ever delivered
    Silent,
    /// Connect fails
    Denied,
    /// Deliver gradient frames of the given size
    Streaming(Size),
}

/// Mock video source for driving the camera state machine in tests.
pub struct MockSource {
    behavior: MockBehavior,
}

impl MockSource {
    pub fn silent() -> Self {
        Self {
            behavior: MockBehavior::Silent,
        }
    }

    pub fn denied() -> Self {
        Self {
            behavior: MockBehavior::Denied,
        }
    }

    pub fn streaming(size: Size) -> Self {
        Self {
            behavior: MockBehavior::Streaming(size),
        }
    }
}

impl VideoSource for MockSource {
    fn connect(&mut self, settings: &CameraSettings) -> CameraResult<TrackInfo> {
        match self.behavior {
            MockBehavior::Denied => Err(CameraError::StreamAcquisition(
                "mock source denied access".to_owned(),
            )),
            MockBehavior::Silent => Ok(TrackInfo {
                format: settings.ideal_resolution,
                device: "Mock Camera (silent)".to_owned(),
            }),
            MockBehavior::Streaming(size) => Ok(TrackInfo {
                format: size,
                device: "Mock Camera".to_owned(),
            }),
        }
    }

    fn stream(&mut self, mut sink: FrameSink, running: Arc<AtomicBool>) -> CameraResult<()> {
        let mut sequence = 0u32;
        while running.load(Ordering::SeqCst) {
            if let MockBehavior::Streaming(size) = self.behavior {
                sink(gradient_frame(size, sequence));
                sequence = sequence.wrapping_add(1);
            }
            thread::sleep(FRAME_INTERVAL);
        }
        Ok(())
    }
}

/// Generate a horizontal gradient test frame, shifted by `sequence` so
/// consecutive frames differ.
fn gradient_frame(size: Size, sequence: u32) -> Frame {
    let mut data = Vec::with_capacity((size.width * size.height * 3) as usize);
    for _y in 0..size.height {
        for x in 0..size.width {
            let luma = (((x * 255) / size.width.max(1)) as u8).wrapping_add(sequence as u8);
            data.extend_from_slice(&[luma, luma, luma]);
        }
    }
    Frame::from_rgb(data, size.width, size.height)
}

/// Surface whose reported frame sizes follow a fixed script, one entry per
/// read; the last entry repeats once the script runs out. An empty script
/// always reads `Size::UNKNOWN`.
pub struct ScriptedSurface {
    sizes: Vec<Size>,
    reads: Cell<usize>,
    paused: bool,
}

impl ScriptedSurface {
    pub fn new(sizes: Vec<Size>) -> Self {
        Self {
            sizes,
            reads: Cell::new(0),
            paused: false,
        }
    }

    pub fn shared(sizes: Vec<Size>) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new(sizes)))
    }

    /// Replace the script and restart reading from its beginning.
    pub fn script(&mut self, sizes: Vec<Size>) {
        self.sizes = sizes;
        self.reads.set(0);
    }
}

impl RenderSurface for ScriptedSurface {
    fn present(&mut self, _frame: Frame) {}

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn detach(&mut self) {
        self.paused = false;
    }

    fn frame_size(&self) -> Size {
        let index = self.reads.get();
        self.reads.set(index + 1);
        self.sizes
            .get(index)
            .or_else(|| self.sizes.last())
            .copied()
            .unwrap_or(Size::UNKNOWN)
    }

    fn frame(&self) -> Option<&Frame> {
        None
    }
}

/// Clock that records requested delays instead of sleeping.
pub struct TestClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the recorded delays, usable after the clock is moved
    /// into a camera.
    pub fn sleeps(&self) -> Arc<Mutex<Vec<Duration>>> {
        Arc::clone(&self.sleeps)
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}
