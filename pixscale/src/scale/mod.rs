//! Fixed-point nearest-neighbour and bilinear scaling of packed ARGB buffers.

pub mod bilinear;
pub mod fixed;
pub mod nearest;
pub mod pad;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "parallel")]
use rayon::slice::ParallelSliceMut;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::ScaleError;
use crate::geom::Extent;

pub use bilinear::bilinear_scale;
pub use fixed::Fixed16;
pub use nearest::nearest_neighbour_scale;
pub use pad::EdgePadded;

/// Largest source dimension. `MAX_DIMENSION << 16` must fit in a `u32`
/// position accumulator. Destination sizes are bounded only by allocation.
pub const MAX_DIMENSION: u32 = 0xffff;

/// Resampling algorithm. The discriminants are the literal values used by
/// script callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[repr(i32)]
pub enum ScaleType {
    #[cfg_attr(feature = "serde", serde(alias = "nearest"))]
    NearestNeighbour = 1,
    Bilinear = 2,
}

impl ScaleType {
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Whether the source copy needs its spare column and row filled.
    pub const fn needs_edge_padding(self) -> bool {
        matches!(self, ScaleType::Bilinear)
    }
}

impl TryFrom<i32> for ScaleType {
    type Error = ScaleError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ScaleType::NearestNeighbour),
            2 => Ok(ScaleType::Bilinear),
            other => Err(ScaleError::UnknownScaleType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scale method '{0}' (expected 'nearest' or 'bilinear')")]
pub struct ParseScaleTypeError(String);

impl FromStr for ScaleType {
    type Err = ParseScaleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest-neighbour" | "nearest-neighbor" => Ok(ScaleType::NearestNeighbour),
            "bilinear" => Ok(ScaleType::Bilinear),
            _ => Err(ParseScaleTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleType::NearestNeighbour => f.write_str("nearest-neighbour"),
            ScaleType::Bilinear => f.write_str("bilinear"),
        }
    }
}

/// How the destination size is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleSize {
    Explicit { width: u32, height: u32 },
    /// Uniform factor, converted to 16.16 fixed point before use.
    Factor(f64),
}

impl ScaleSize {
    /// Destination extent for a source of the given size.
    pub fn resolve(self, source: Extent) -> Result<Extent, ScaleError> {
        match self {
            ScaleSize::Explicit { width, height } => checked_target(width as u64, height as u64),
            ScaleSize::Factor(factor) => {
                let f = Fixed16::from_factor(factor)?;
                checked_target(f.apply(source.width), f.apply(source.height))
            }
        }
    }
}

/// Accept a destination size if neither side is zero and both fit a `u32`.
fn checked_target(width: u64, height: u64) -> Result<Extent, ScaleError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Extent::new(w, h)),
        _ => Err(ScaleError::InvalidDimensions { width, height }),
    }
}

/// Accept a source size only if both sides are in `1..=MAX_DIMENSION`.
pub(crate) fn checked_source(extent: Extent) -> Result<Extent, ScaleError> {
    if extent.is_empty() || extent.width > MAX_DIMENSION || extent.height > MAX_DIMENSION {
        return Err(ScaleError::InvalidDimensions {
            width: extent.width as u64,
            height: extent.height as u64,
        });
    }
    Ok(extent)
}

/// Scale a padded source into `dst`, filling `dst.width × dst.height` pixels.
///
/// For bilinear scaling the padding of `src` must already be replicated.
pub fn scale_into(dst: &mut PixelBuffer, src: &EdgePadded, scale_type: ScaleType) {
    match scale_type {
        ScaleType::NearestNeighbour => nearest_neighbour_scale(dst, src.buffer()),
        ScaleType::Bilinear => bilinear_scale(dst, src),
    }
}

/// Scale an owned pixel buffer, returning a new tightly packed buffer.
pub fn scale_buffer(
    src: &PixelBuffer,
    size: ScaleSize,
    scale_type: ScaleType,
) -> Result<PixelBuffer, ScaleError> {
    let source = checked_source(Extent::new(src.width, src.height))?;
    let target = size.resolve(source)?;
    let mut dst = PixelBuffer::try_new(target.width, target.height, target.width)?;

    match scale_type {
        ScaleType::NearestNeighbour => nearest_neighbour_scale(&mut dst, src),
        ScaleType::Bilinear => {
            let mut padded = EdgePadded::copy_from(src)?;
            padded.replicate_edges();
            bilinear_scale(&mut dst, &padded);
        }
    }
    Ok(dst)
}

/// Run `f(row, v)` for each destination row, where `row` is the logical part
/// of the row and `v = y * deltay` is its 16.16 source position.
pub(crate) fn for_each_row<F>(dst: &mut PixelBuffer, deltay: u32, f: F)
where
    F: Fn(&mut [u32], u32) + Sync + Send,
{
    let width = dst.width as usize;
    let pitch = dst.pitch as usize;
    let height = dst.height as usize;
    let visit = |(y, row): (usize, &mut [u32])| f(&mut row[..width], (y as u64 * deltay as u64) as u32);

    #[cfg(feature = "parallel")]
    dst.buf.par_chunks_mut(pitch).take(height).enumerate().for_each(visit);

    #[cfg(not(feature = "parallel"))]
    dst.buf.chunks_mut(pitch).take(height).enumerate().for_each(visit);
}
