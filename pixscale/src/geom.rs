#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels, widened so it cannot overflow.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A rectangular region of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self { left, top, width, height }
    }

    /// The rectangle covering a whole image.
    pub const fn full(extent: Extent) -> Self {
        Self::new(0, 0, extent.width, extent.height)
    }

    pub const fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Non-empty and entirely inside an image of the given size.
    pub fn fits_within(&self, extent: Extent) -> bool {
        let right = self.left as u64 + self.width as u64;
        let bottom = self.top as u64 + self.height as u64;
        !self.extent().is_empty() && right <= extent.width as u64 && bottom <= extent.height as u64
    }
}
