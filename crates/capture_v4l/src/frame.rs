//! Frame processing and still encoding

use crate::{CameraResult, Rect, Size};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, RgbImage};
use std::time::Instant;

/// JPEG quality used for still extraction
pub const JPEG_QUALITY: u8 = 90;

/// A decoded RGB frame from the capture stream
#[derive(Debug, Clone)]
pub struct Frame {
    /// Packed RGB8 pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGB frame from raw pixel data.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Decode a packed YUYV (4:2:2) buffer into an RGB frame.
    ///
    /// Each 4-byte group carries two pixels sharing U and V.
    pub fn from_yuyv(raw: &[u8], width: u32, height: u32) -> Self {
        let pixels = (width * height) as usize;
        let mut data = Vec::with_capacity(pixels * 3);

        for group in raw.chunks_exact(4).take(pixels / 2) {
            let (y0, u, y1, v) = (group[0], group[1], group[2], group[3]);
            let (r, g, b) = yuv_to_rgb(y0, u, v);
            data.extend_from_slice(&[r, g, b]);
            let (r, g, b) = yuv_to_rgb(y1, u, v);
            data.extend_from_slice(&[r, g, b]);
        }

        // Short source buffers pad with black rather than panicking
        data.resize(pixels * 3, 0);

        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Convert to an `image` RGB buffer
    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_raw(self.width, self.height, self.data.clone())
            .expect("frame buffer out of sync with its dimensions")
    }

    /// Crop frame to rectangle, clamped to the frame bounds
    pub fn crop(&self, rect: &Rect) -> Frame {
        let src_x = rect.x.max(0) as u32;
        let src_y = rect.y.max(0) as u32;
        let crop_width = rect.width.min(self.width.saturating_sub(src_x));
        let crop_height = rect.height.min(self.height.saturating_sub(src_y));
        if crop_width == 0 || crop_height == 0 {
            return Frame {
                data: Vec::new(),
                width: 0,
                height: 0,
                timestamp: self.timestamp,
            };
        }

        let mut cropped_data = Vec::with_capacity((crop_width * crop_height * 3) as usize);

        for y in 0..crop_height {
            let src_offset = ((src_y + y) * self.width + src_x) as usize * 3;
            let row = &self.data[src_offset..src_offset + (crop_width as usize * 3)];
            cropped_data.extend_from_slice(row);
        }

        Frame {
            data: cropped_data,
            width: crop_width,
            height: crop_height,
            timestamp: self.timestamp,
        }
    }

    /// Encode the frame as JPEG
    pub fn encode_jpeg(&self, quality: u8) -> CameraResult<Vec<u8>> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode(
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

/// An encoded still image, paired with the crop region it was extracted from.
/// Immutable after creation.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    jpeg: Vec<u8>,
    rect: Rect,
}

impl CapturedFrame {
    pub fn new(jpeg: Vec<u8>, rect: Rect) -> Self {
        Self { jpeg, rect }
    }

    /// Encoded `image/jpeg` payload
    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// Convert YUV values to RGB using the ITU-R BT.601 formula.
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = f32::from(y);
    let u = f32::from(u) - 128.0;
    let v = f32::from(v) - 128.0;

    let r = y + 1.402 * v;
    let g = y - 0.344_14 * u - 0.714_14 * v;
    let b = y + 1.772 * u;

    let clamp = |value: f32| value.clamp(0.0, 255.0) as u8;

    (clamp(r), clamp(g), clamp(b))
}
