//! JPEG still export

use crate::{ExportError, ExportResult};
use capture_v4l::CapturedFrame;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the already-encoded JPEG payload as-is.
pub struct JpegExporter;

impl JpegExporter {
    pub fn export(capture: &CapturedFrame, path: &Path) -> ExportResult<PathBuf> {
        if capture.jpeg().is_empty() {
            return Err(ExportError::NoCapture);
        }
        fs::write(path, capture.jpeg())?;
        Ok(path.to_path_buf())
    }
}
