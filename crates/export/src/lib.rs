//! Export module for SnapCam
//!
//! Persists a confirmed capture as JPEG or PNG.

mod jpeg;
mod png;

pub use jpeg::JpegExporter;
pub use png::PngExporter;

use capture_v4l::CapturedFrame;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("no capture to export")]
    NoCapture,

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output format, chosen from the target path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
            Ok(Self::Jpeg)
        } else if extension.eq_ignore_ascii_case("png") {
            Ok(Self::Png)
        } else {
            Err(ExportError::UnsupportedFormat(extension.to_owned()))
        }
    }
}

/// Write a captured still to `path`, choosing the exporter by extension.
pub fn export_capture(capture: &CapturedFrame, path: &Path) -> ExportResult<PathBuf> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Jpeg => JpegExporter::export(capture, path),
        ExportFormat::Png => PngExporter::export(capture, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("a.jpg")).unwrap(),
            ExportFormat::Jpeg
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.JPEG")).unwrap(),
            ExportFormat::Jpeg
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.png")).unwrap(),
            ExportFormat::Png
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("a.gif")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ExportFormat::from_path(Path::new("noext")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }
}
