//! Camera lifecycle state machine

use crate::frame::{CapturedFrame, JPEG_QUALITY};
use crate::traits::{Clock, FrameSink, RenderSurface, SystemClock, VideoSource};
use crate::{CameraError, CameraResult, CameraSettings, Rect, Size};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Closed,
    Opening,
    Open,
}

/// Bounded retry budget for the resolution poll in `open`.
///
/// Stream dimensions are populated asynchronously after the track starts
/// and may read as zero for a short, device-dependent interval.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Re-checks after the initial read, before giving up
    pub attempts: u32,
    /// Fixed delay between checks
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// An owned stream track: the pump thread plus its stop flag.
struct StreamTrack<V> {
    running: Arc<AtomicBool>,
    pump: JoinHandle<V>,
}

impl<V> StreamTrack<V> {
    /// Stop the pump loop and recover the source for a later reopen.
    fn stop(self) -> V {
        self.running.store(false, Ordering::SeqCst);
        match self.pump.join() {
            Ok(source) => source,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Camera device wrapping a live capture stream.
///
/// State machine: `Closed -> Opening -> Open -> Closed`. One instance owns
/// its stream tracks and its render surface binding exclusively; commands
/// are expected to arrive serialized (one worker thread per camera).
pub struct Camera<V, S>
where
    V: VideoSource,
    S: RenderSurface + Send + 'static,
{
    state: DeviceState,
    source: Option<V>,
    tracks: Vec<StreamTrack<V>>,
    surface: Arc<Mutex<S>>,
    resolution: Size,
    retry: RetryPolicy,
    clock: Box<dyn Clock>,
}

impl<V, S> Camera<V, S>
where
    V: VideoSource,
    S: RenderSurface + Send + 'static,
{
    pub fn new(source: V, surface: Arc<Mutex<S>>) -> Self {
        Self {
            state: DeviceState::Closed,
            source: Some(source),
            tracks: Vec::new(),
            surface,
            resolution: Size::UNKNOWN,
            retry: RetryPolicy::default(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DeviceState::Open
    }

    /// Observed resolution while open, `Size::UNKNOWN` in any other state.
    pub fn resolution(&self) -> Size {
        if self.state == DeviceState::Open {
            self.resolution
        } else {
            Size::UNKNOWN
        }
    }

    /// Open the device: acquire a stream per `settings`, bind it to the
    /// surface, and wait for the surface to report a frame size.
    ///
    /// Returns the observed resolution. Fails with `AlreadyOpen` when not
    /// closed, `StreamAcquisition` when no matching device produces a
    /// stream, and `ResolutionTimeout` when the retry budget runs out.
    pub fn open(&mut self, settings: &CameraSettings) -> CameraResult<Size> {
        if self.state != DeviceState::Closed {
            return Err(CameraError::AlreadyOpen);
        }
        let mut source = self.source.take().ok_or(CameraError::AlreadyOpen)?;

        self.state = DeviceState::Opening;
        let info = match source.connect(settings) {
            Ok(info) => info,
            Err(err) => {
                self.source = Some(source);
                self.state = DeviceState::Closed;
                return Err(err);
            }
        };
        log::info!(
            "connected {} at {}x{}",
            info.device,
            info.format.width,
            info.format.height
        );

        self.start_track(source);

        let mut attempt = 0;
        loop {
            let size = self.surface.lock().frame_size();
            if !size.is_unknown() {
                self.state = DeviceState::Open;
                self.resolution = size;
                log::info!("camera open, surface reports {}x{}", size.width, size.height);
                return Ok(size);
            }
            if attempt == self.retry.attempts {
                self.stop_tracks();
                self.state = DeviceState::Closed;
                return Err(CameraError::ResolutionTimeout(self.retry.attempts));
            }
            attempt += 1;
            self.clock.sleep(self.retry.delay);
        }
    }

    /// Stop every owned stream track and return to `Closed`.
    pub fn close(&mut self) -> CameraResult<()> {
        if self.state != DeviceState::Open {
            return Err(CameraError::Closed);
        }
        self.stop_tracks();
        self.resolution = Size::UNKNOWN;
        self.state = DeviceState::Closed;
        log::info!("camera closed");
        Ok(())
    }

    /// Freeze the surface's rendering. Device state stays `Open`.
    pub fn pause(&mut self) -> CameraResult<()> {
        if self.state != DeviceState::Open {
            return Err(CameraError::Closed);
        }
        self.surface.lock().pause();
        Ok(())
    }

    /// Resume the surface's rendering.
    pub fn play(&mut self) -> CameraResult<()> {
        if self.state != DeviceState::Open {
            return Err(CameraError::Closed);
        }
        self.surface.lock().play();
        Ok(())
    }

    /// Extract a still from the current frame (the frozen frame while
    /// paused), cropped to `rect` and encoded as JPEG.
    pub fn capture_still(&self, rect: Rect) -> CameraResult<CapturedFrame> {
        if self.state != DeviceState::Open {
            return Err(CameraError::Closed);
        }
        if rect.has_zero_field() {
            return Err(CameraError::InvalidRect(rect));
        }

        let surface = self.surface.lock();
        let frame = surface.frame().ok_or(CameraError::NoFrame)?;
        let cropped = frame.crop(&rect);
        if cropped.width == 0 || cropped.height == 0 {
            return Err(CameraError::InvalidRect(rect));
        }

        let jpeg = cropped.encode_jpeg(JPEG_QUALITY)?;
        Ok(CapturedFrame::new(jpeg, rect))
    }

    fn start_track(&mut self, source: V) {
        let running = Arc::new(AtomicBool::new(true));
        let run = Arc::clone(&running);
        let surface = Arc::clone(&self.surface);

        let pump = thread::spawn(move || {
            let mut source = source;
            let sink: FrameSink = Box::new(move |frame| surface.lock().present(frame));
            if let Err(err) = source.stream(sink, run) {
                log::warn!("stream track stopped: {err}");
            }
            source
        });

        self.tracks.push(StreamTrack { running, pump });
    }

    fn stop_tracks(&mut self) {
        for track in self.tracks.drain(..) {
            self.source = Some(track.stop());
        }
        self.surface.lock().detach();
    }
}

impl<V, S> Drop for Camera<V, S>
where
    V: VideoSource,
    S: RenderSurface + Send + 'static,
{
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSource, ScriptedSurface, TestClock};
    use crate::surface::PreviewSurface;
    use crate::Facing;
    use std::time::Instant;

    fn settings() -> CameraSettings {
        CameraSettings {
            ideal_resolution: Size::new(640, 480),
            facing: Facing::Front,
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 50,
            delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn open_reports_surface_resolution() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);

        let size = camera.open(&settings()).expect("open failed");
        assert_eq!(size, Size::new(640, 480));
        assert_eq!(camera.state(), DeviceState::Open);
        assert_eq!(camera.resolution(), Size::new(640, 480));
    }

    #[test]
    fn open_twice_fails_with_already_open() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);

        camera.open(&settings()).expect("open failed");
        assert!(matches!(
            camera.open(&settings()),
            Err(CameraError::AlreadyOpen)
        ));
    }

    #[test]
    fn operations_on_closed_camera_fail() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);

        assert!(matches!(camera.close(), Err(CameraError::Closed)));
        assert!(matches!(camera.pause(), Err(CameraError::Closed)));
        assert!(matches!(camera.play(), Err(CameraError::Closed)));
        assert!(matches!(
            camera.capture_still(Rect::new(1, 1, 2, 2)),
            Err(CameraError::Closed)
        ));
    }

    #[test]
    fn close_after_close_fails() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);

        camera.open(&settings()).expect("open failed");
        camera.close().expect("close failed");
        assert!(matches!(camera.close(), Err(CameraError::Closed)));
    }

    #[test]
    fn resolution_unknown_unless_open() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);
        assert_eq!(camera.resolution(), Size::UNKNOWN);

        camera.open(&settings()).expect("open failed");
        assert_eq!(camera.resolution(), Size::new(640, 480));

        camera.close().expect("close failed");
        assert_eq!(camera.resolution(), Size::UNKNOWN);
    }

    #[test]
    fn retry_budget_exhaustion_times_out() {
        // a surface that never reports a size
        let surface = ScriptedSurface::shared(vec![]);
        let clock = TestClock::new();
        let sleeps = clock.sleeps();
        let mut camera = Camera::new(MockSource::silent(), surface).with_clock(Box::new(clock));

        let err = camera.open(&settings()).unwrap_err();
        assert!(matches!(err, CameraError::ResolutionTimeout(5)));
        assert_eq!(camera.state(), DeviceState::Closed);

        // one immediate check plus five retries, each after the fixed delay
        let recorded = sleeps.lock().clone();
        assert_eq!(recorded.len(), 5);
        assert!(recorded
            .iter()
            .all(|delay| *delay == Duration::from_millis(500)));
    }

    #[test]
    fn open_succeeds_after_delayed_size() {
        let surface = ScriptedSurface::shared(vec![
            Size::UNKNOWN,
            Size::UNKNOWN,
            Size::new(1280, 720),
        ]);
        let clock = TestClock::new();
        let sleeps = clock.sleeps();
        let mut camera = Camera::new(MockSource::silent(), surface).with_clock(Box::new(clock));

        let size = camera.open(&settings()).expect("open failed");
        assert_eq!(size, Size::new(1280, 720));
        assert_eq!(sleeps.lock().len(), 2);
    }

    #[test]
    fn reopen_after_timeout_is_allowed() {
        let surface = ScriptedSurface::shared(vec![]);
        let clock = TestClock::new();
        let mut camera = Camera::new(MockSource::silent(), Arc::clone(&surface))
            .with_clock(Box::new(clock));

        camera.open(&settings()).unwrap_err();
        surface.lock().script(vec![Size::new(640, 480)]);

        camera.open(&settings()).expect("reopen failed");
        assert!(camera.is_open());
    }

    #[test]
    fn connect_failure_leaves_camera_closed() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::denied(), surface);

        let err = camera.open(&settings()).unwrap_err();
        assert!(matches!(err, CameraError::StreamAcquisition(_)));
        assert_eq!(camera.state(), DeviceState::Closed);
    }

    #[test]
    fn capture_rejects_zero_rect_fields_while_open() {
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);
        camera.open(&settings()).expect("open failed");

        for rect in [
            Rect::new(0, 1, 10, 10),
            Rect::new(1, 0, 10, 10),
            Rect::new(1, 1, 0, 10),
            Rect::new(1, 1, 10, 0),
        ] {
            assert!(matches!(
                camera.capture_still(rect),
                Err(CameraError::InvalidRect(_))
            ));
        }
    }

    #[test]
    fn capture_without_a_live_frame_fails() {
        // the scripted surface reports a size but never holds a frame
        let surface = ScriptedSurface::shared(vec![Size::new(640, 480)]);
        let mut camera = Camera::new(MockSource::silent(), surface);
        camera.open(&settings()).expect("open failed");

        assert!(matches!(
            camera.capture_still(Rect::new(1, 1, 10, 10)),
            Err(CameraError::NoFrame)
        ));
    }

    #[test]
    fn capture_still_encodes_the_live_frame() {
        let surface = PreviewSurface::shared();
        let mut camera = Camera::new(
            MockSource::streaming(Size::new(64, 48)),
            Arc::clone(&surface),
        )
        .with_retry(fast_retry());

        camera.open(&settings()).expect("open failed");

        let rect = Rect::new(8, 8, 32, 24);
        let still = camera.capture_still(rect).expect("capture failed");
        assert_eq!(still.rect(), rect);
        assert_eq!(&still.jpeg()[0..2], &[0xFF, 0xD8]);

        camera.close().expect("close failed");
    }

    #[test]
    fn capture_rejects_rect_outside_the_frame() {
        let surface = PreviewSurface::shared();
        let mut camera = Camera::new(
            MockSource::streaming(Size::new(64, 48)),
            Arc::clone(&surface),
        )
        .with_retry(fast_retry());

        camera.open(&settings()).expect("open failed");
        assert!(matches!(
            camera.capture_still(Rect::new(100, 100, 8, 8)),
            Err(CameraError::InvalidRect(_))
        ));
    }

    #[test]
    fn pause_freezes_and_play_resumes_the_preview() {
        let surface = PreviewSurface::shared();
        let mut camera = Camera::new(
            MockSource::streaming(Size::new(32, 16)),
            Arc::clone(&surface),
        )
        .with_retry(fast_retry());

        camera.open(&settings()).expect("open failed");
        camera.pause().expect("pause failed");

        let frozen = surface.lock().frame().map(|f| f.timestamp);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(surface.lock().frame().map(|f| f.timestamp), frozen);
        assert!(camera.is_open());

        camera.play().expect("play failed");
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if surface.lock().frame().map(|f| f.timestamp) != frozen {
                break;
            }
            assert!(Instant::now() < deadline, "preview did not resume");
            thread::sleep(Duration::from_millis(5));
        }
    }
}
