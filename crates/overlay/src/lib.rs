//! Overlay geometry for SnapCam
//!
//! Fits the live preview into the viewport and positions the capture
//! guide rectangle.

pub mod fit;
pub mod guide;

pub use fit::{stretch_size, Axis, Stretched};
pub use guide::{centered, frame_guide, scaled};
