use thiserror::Error;

use crate::geom::{Extent, Rect};
use crate::host::ImageHandle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("invalid destination dimensions {width}x{height}")]
    InvalidDimensions { width: u64, height: u64 },

    #[error("source region {rect:?} is empty or outside the {}x{} image", .extent.width, .extent.height)]
    InvalidRect { rect: Rect, extent: Extent },

    #[error("scale factor {0} is not a positive finite number")]
    InvalidScaleFactor(f64),

    #[error("unknown scale type {0}")]
    UnknownScaleType(i32),

    #[error("no image bound to handle {0}")]
    UnknownImage(ImageHandle),

    #[error("pixel buffer holds {actual} pixels, need at least {expected}")]
    BufferTooSmall { expected: usize, actual: usize },
}

impl ScaleError {
    /// Resource exhaustion, as opposed to a rejected request.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, ScaleError::OutOfMemory { .. })
    }
}
