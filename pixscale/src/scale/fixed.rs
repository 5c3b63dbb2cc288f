//! 16.16 fixed-point helpers shared by both scalers.

use crate::error::ScaleError;

pub const FIXED_SHIFT: u32 = 16;
pub const FRACTION_MASK: u32 = 0xffff;

/// A 16.16 fixed-point scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed16(i64);

impl Fixed16 {
    pub const ONE: Fixed16 = Fixed16(1 << FIXED_SHIFT);

    pub const fn from_raw(raw: i64) -> Self {
        Fixed16(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert a floating-point factor by multiplying by 65536 and truncating.
    ///
    /// Factors that truncate to zero are rejected along with non-finite and
    /// non-positive ones.
    pub fn from_factor(factor: f64) -> Result<Self, ScaleError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ScaleError::InvalidScaleFactor(factor));
        }
        let raw = (factor * 65536.0) as i64;
        if raw <= 0 {
            return Err(ScaleError::InvalidScaleFactor(factor));
        }
        Ok(Fixed16(raw))
    }

    /// `floor(dim * raw / 65536)` in integer arithmetic, saturating at `u64::MAX`.
    pub fn apply(self, dim: u32) -> u64 {
        let scaled = (dim as u128 * self.0 as u128) >> FIXED_SHIFT;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

/// Source advance per destination pixel: `(src_len << 16) / dst_len`.
///
/// `src_len` must not exceed `MAX_DIMENSION` and `dst_len` must be non-zero.
/// `dst_len` steps from zero never pass `src_len << 16`, so any destination
/// length keeps the position inside a `u32`.
#[inline]
pub fn step(src_len: u32, dst_len: u32) -> u32 {
    debug_assert!(dst_len > 0);
    (((src_len as u64) << FIXED_SHIFT) / dst_len as u64) as u32
}

/// Integer part of a 16.16 position.
#[inline]
pub fn whole(pos: u32) -> usize {
    (pos >> FIXED_SHIFT) as usize
}
