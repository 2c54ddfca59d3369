//! Aspect-preserving stretch sizing

use capture_v4l::Size;

/// The axis fully constrained by the container when fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// Result of fitting a child size into a parent viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stretched {
    pub width: u32,
    pub height: u32,
    /// Limiting axis; absent for the zero sentinel
    pub base: Option<Axis>,
}

impl Stretched {
    /// Returned whenever any input dimension is zero
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
        base: None,
    };

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Largest rectangle with the child's aspect ratio that fits inside the
/// parent, limited by exactly one axis.
///
/// All divisions truncate toward zero, matching downstream pixel-rect
/// math. Any zero input short-circuits to `Stretched::ZERO`, a zero child
/// dimension included.
pub fn stretch_size(parent: Size, child: Size) -> Stretched {
    if parent.is_unknown() || child.is_unknown() {
        return Stretched::ZERO;
    }

    // stretch to the parent width first
    let height =
        (u64::from(parent.width) * u64::from(child.height) / u64::from(child.width)) as u32;
    if parent.height > height {
        return Stretched {
            width: parent.width,
            height,
            base: Some(Axis::Width),
        };
    }

    // too tall, stretch to the parent height instead
    let width =
        (u64::from(parent.height) * u64::from(child.width) / u64::from(child.height)) as u32;
    Stretched {
        width,
        height: parent.height,
        base: Some(Axis::Height),
    }
}
