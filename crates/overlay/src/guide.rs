//! Capture guide geometry

use capture_v4l::{Rect, Size};

/// Scale a size by per-axis ratios, truncating toward zero.
pub fn scaled(size: Size, width_ratio: f64, height_ratio: f64) -> Size {
    Size::new(
        (f64::from(size.width) * width_ratio) as u32,
        (f64::from(size.height) * height_ratio) as u32,
    )
}

/// Center `inner` inside `outer`. An inner dimension larger than the
/// outer one is pinned to the origin on that axis.
pub fn centered(outer: Size, inner: Size) -> Rect {
    Rect::new(
        (outer.width.saturating_sub(inner.width) / 2) as i32,
        (outer.height.saturating_sub(inner.height) / 2) as i32,
        inner.width,
        inner.height,
    )
}

/// Centered rectangle covering the given fraction of `outer`; both the
/// on-screen guide and the capture crop use this shape.
pub fn frame_guide(outer: Size, width_ratio: f64, height_ratio: f64) -> Rect {
    centered(outer, scaled(outer, width_ratio, height_ratio))
}
