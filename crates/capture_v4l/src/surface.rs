//! Live preview surface

use crate::frame::Frame;
use crate::traits::RenderSurface;
use crate::Size;
use parking_lot::Mutex;
use std::sync::Arc;

/// Surface handle shared between the camera track and the UI
pub type SharedSurface = Arc<Mutex<PreviewSurface>>;

/// Latest-frame buffer backing the live preview.
///
/// While paused, presented frames are dropped so the visible frame, and any
/// still extracted from it, stays frozen.
#[derive(Default)]
pub struct PreviewSurface {
    frame: Option<Frame>,
    paused: bool,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSurface {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl RenderSurface for PreviewSurface {
    fn present(&mut self, frame: Frame) {
        if !self.paused {
            self.frame = Some(frame);
        }
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn detach(&mut self) {
        self.frame = None;
        self.paused = false;
    }

    fn frame_size(&self) -> Size {
        self.frame.as_ref().map_or(Size::UNKNOWN, |frame| frame.size())
    }

    fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }
}
