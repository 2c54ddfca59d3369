//! PNG still export

use crate::{ExportError, ExportResult};
use capture_v4l::CapturedFrame;
use std::path::{Path, PathBuf};

/// Re-encodes the captured JPEG payload as PNG.
pub struct PngExporter;

impl PngExporter {
    pub fn export(capture: &CapturedFrame, path: &Path) -> ExportResult<PathBuf> {
        if capture.jpeg().is_empty() {
            return Err(ExportError::NoCapture);
        }
        let decoded =
            image::load_from_memory_with_format(capture.jpeg(), image::ImageFormat::Jpeg)?;
        decoded.save_with_format(path, image::ImageFormat::Png)?;
        Ok(path.to_path_buf())
    }
}
