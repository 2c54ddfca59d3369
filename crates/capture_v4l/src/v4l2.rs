//! V4L2 source implementation using the v4l crate.

use crate::frame::Frame;
use crate::traits::{FrameSink, TrackInfo, VideoSource};
use crate::{CameraError, CameraResult, CameraSettings, Facing, Size};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::Device;

/// Number of mmap buffers for the capture stream
const BUFFER_COUNT: u32 = 4;
/// Highest device index probed during discovery
const MAX_PROBE_INDEX: u32 = 10;

/// V4L2 video source.
///
/// Facing maps onto device enumeration order: `Front` takes the first
/// usable capture device, `Rear` requires a second one and fails when it
/// is absent.
pub struct V4l2Source {
    device: Option<Device>,
    format: Size,
}

impl V4l2Source {
    pub fn new() -> Self {
        Self {
            device: None,
            format: Size::UNKNOWN,
        }
    }

    /// Indices of devices that can capture and stream video.
    fn discover() -> Vec<u32> {
        let mut found = Vec::new();
        for index in 0..MAX_PROBE_INDEX {
            if !Path::new(&format!("/dev/video{index}")).exists() {
                continue;
            }
            let Ok(device) = Device::new(index as usize) else {
                continue;
            };
            let Ok(caps) = device.query_caps() else {
                continue;
            };
            if caps
                .capabilities
                .contains(v4l::capability::Flags::VIDEO_CAPTURE)
                && caps.capabilities.contains(v4l::capability::Flags::STREAMING)
            {
                found.push(index);
            }
        }
        found
    }

    fn select_device(facing: Facing) -> CameraResult<u32> {
        let devices = Self::discover();
        match facing {
            Facing::Front => devices.first().copied().ok_or_else(|| {
                CameraError::StreamAcquisition("no capture device found".to_owned())
            }),
            Facing::Rear => devices.get(1).copied().ok_or_else(|| {
                CameraError::StreamAcquisition("no rear-facing capture device".to_owned())
            }),
        }
    }
}

impl Default for V4l2Source {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for V4l2Source {
    fn connect(&mut self, settings: &CameraSettings) -> CameraResult<TrackInfo> {
        let index = Self::select_device(settings.facing)?;

        let device = Device::new(index as usize)
            .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;
        let caps = device
            .query_caps()
            .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;

        // Ideal-resolution semantics: request the hint, keep whatever the
        // driver actually grants.
        let mut fmt = device
            .format()
            .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;
        fmt.width = settings.ideal_resolution.width;
        fmt.height = settings.ideal_resolution.height;
        fmt.fourcc = v4l::FourCC::new(b"YUYV");

        let fmt = device
            .set_format(&fmt)
            .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;
        if fmt.fourcc.repr != *b"YUYV" {
            return Err(CameraError::StreamAcquisition(format!(
                "unsupported pixel format {}",
                String::from_utf8_lossy(&fmt.fourcc.repr)
            )));
        }

        self.format = Size::new(fmt.width, fmt.height);
        self.device = Some(device);

        log::debug!(
            "selected /dev/video{index} ({}), granted {}x{}",
            caps.card,
            fmt.width,
            fmt.height
        );

        Ok(TrackInfo {
            format: self.format,
            device: caps.card,
        })
    }

    fn stream(&mut self, mut sink: FrameSink, running: Arc<AtomicBool>) -> CameraResult<()> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| CameraError::StreamAcquisition("source not connected".to_owned()))?;
        let Size { width, height } = self.format;

        let mut stream = Stream::with_buffers(device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;

        while running.load(Ordering::SeqCst) {
            let (buf, _meta) = stream
                .next()
                .map_err(|err| CameraError::StreamAcquisition(err.to_string()))?;
            sink(Frame::from_yuyv(buf, width, height));
        }

        Ok(())
    }
}
