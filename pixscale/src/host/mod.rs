//! The narrow interface the resampler needs from whatever stores images.

mod memory;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::{try_alloc_pixels, PixelBuffer};
use crate::error::ScaleError;
use crate::geom::{Extent, Rect};

pub use memory::MemoryHost;

/// Opaque reference to an image (or an unbound placeholder) owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageHandle(pub u32);

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Image storage the scale operations read from and write to.
pub trait ImageHost {
    /// Pixel dimensions of a bound image.
    fn image_size(&self, image: ImageHandle) -> Result<Extent, ScaleError>;

    /// Copy `rect` of `image` into `dst`, row `y` of the region starting at
    /// `dst[y * pitch]`. Pixels of `dst` outside the region are left alone.
    fn read_pixels(
        &self,
        image: ImageHandle,
        rect: Rect,
        dst: &mut [u32],
        pitch: usize,
    ) -> Result<(), ScaleError>;

    /// Allocate `len` zeroed pixels of scratch or destination storage.
    fn allocate(&mut self, len: usize) -> Result<Vec<u32>, ScaleError> {
        try_alloc_pixels(len)
    }

    /// Bind `pixels` to `placeholder` as a new image.
    ///
    /// On error nothing is bound and the pixels are dropped.
    fn create_image_raw(
        &mut self,
        placeholder: ImageHandle,
        pixels: PixelBuffer,
    ) -> Result<(), ScaleError>;
}

/// Copy `rect` out of `src` at the given destination pitch.
pub(crate) fn copy_region(
    src: &PixelBuffer,
    rect: Rect,
    dst: &mut [u32],
    pitch: usize,
) -> Result<(), ScaleError> {
    let extent = Extent::new(src.width, src.height);
    if !rect.fits_within(extent) {
        return Err(ScaleError::InvalidRect { rect, extent });
    }
    let width = rect.width as usize;
    let needed = pitch * (rect.height as usize - 1) + width;
    if pitch < width || dst.len() < needed {
        return Err(ScaleError::BufferTooSmall {
            expected: needed.max(width * rect.height as usize),
            actual: dst.len(),
        });
    }

    let left = rect.left as usize;
    for y in 0..rect.height as usize {
        let row = src.row(rect.top + y as u32);
        dst[y * pitch..y * pitch + width].copy_from_slice(&row[left..left + width]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_buf(width, height, width, (0..width * height).collect())
    }

    #[test]
    fn copy_region_uses_destination_pitch() {
        let src = numbered(4, 3);
        let mut dst = vec![u32::MAX; 9];
        copy_region(&src, Rect::new(1, 1, 2, 2), &mut dst, 3).unwrap();
        assert_eq!(dst, vec![5, 6, u32::MAX, 9, 10, u32::MAX, u32::MAX, u32::MAX, u32::MAX]);
    }

    #[test]
    fn copy_region_rejects_outside_rect() {
        let src = numbered(4, 3);
        let mut dst = vec![0; 64];
        let err = copy_region(&src, Rect::new(3, 0, 2, 1), &mut dst, 8).unwrap_err();
        assert!(matches!(err, ScaleError::InvalidRect { .. }));
    }

    #[test]
    fn copy_region_rejects_small_destination() {
        let src = numbered(4, 3);
        let mut dst = vec![0; 5];
        let err = copy_region(&src, Rect::full(Extent::new(4, 3)), &mut dst, 4).unwrap_err();
        assert!(matches!(err, ScaleError::BufferTooSmall { .. }));
    }

    #[test]
    fn handle_display() {
        assert_eq!(ImageHandle(12).to_string(), "#12");
    }
}
