//! Camera capture module for SnapCam
//!
//! Provides the camera lifecycle state machine and its V4L2 streaming
//! backend.

pub mod camera;
pub mod frame;
pub mod surface;
pub mod traits;
pub mod v4l2;

#[cfg(test)]
pub mod mock;

pub use camera::{Camera, DeviceState, RetryPolicy};
pub use frame::{CapturedFrame, Frame};
pub use surface::{PreviewSurface, SharedSurface};
pub use traits::{Clock, FrameSink, RenderSurface, SystemClock, TrackInfo, VideoSource};
pub use v4l2::V4l2Source;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera is already opened")]
    AlreadyOpen,

    #[error("camera is closed")]
    Closed,

    #[error("invalid capture rect: {0:?}")]
    InvalidRect(Rect),

    #[error("no live frame available")]
    NoFrame,

    #[error("stream acquisition failed: {0}")]
    StreamAcquisition(String),

    #[error("no frame size reported after {0} retries")]
    ResolutionTimeout(u32),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Frame or viewport dimensions in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Sentinel for a not-yet-known size
    pub const UNKNOWN: Self = Self {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_unknown(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Viewport orientation, derived from comparing width to height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Which physical camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// First usable capture device, soft preference
    Front,
    /// Second capture device, required to exist
    Rear,
}

/// Open-time camera configuration
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Desired frame dimensions; a hint, the driver reports the actual
    pub ideal_resolution: Size,
    pub facing: Facing,
}

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True when any coordinate or dimension is zero; such rects are
    /// rejected by region extraction.
    pub fn has_zero_field(&self) -> bool {
        self.x == 0 || self.y == 0 || self.width == 0 || self.height == 0
    }
}
