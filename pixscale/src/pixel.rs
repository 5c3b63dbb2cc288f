//! Packed 32-bit colour values.
//!
//! The bit layout is fixed: alpha in bits 24–31, red in 16–23, green in 8–15
//! and blue in 0–7. Stored images depend on it, so it must not change.

/// A packed ARGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0);

    /// Pack four 8-bit channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Argb(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Pack channel values given as wider integers, keeping the low 8 bits of each.
    #[inline]
    pub(crate) const fn from_wide(r: i32, g: i32, b: i32, a: i32) -> Self {
        Argb(
            (((a & 0xff) as u32) << 24)
                | (((r & 0xff) as u32) << 16)
                | (((g & 0xff) as u32) << 8)
                | (b & 0xff) as u32,
        )
    }

    #[inline]
    pub const fn red(self) -> u8 {
        ((self.0 & 0x00ff_0000) >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        ((self.0 & 0x0000_ff00) >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        (self.0 & 0x0000_00ff) as u8
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        ((self.0 & 0xff00_0000) >> 24) as u8
    }

    /// Channels in `[r, g, b, a]` order.
    #[inline]
    pub const fn channels(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    /// Build from an RGBA8 quadruple as found in decoded image data.
    #[inline]
    pub const fn from_rgba(px: [u8; 4]) -> Self {
        Argb::new(px[0], px[1], px[2], px[3])
    }

    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        self.channels()
    }
}

impl From<u32> for Argb {
    fn from(v: u32) -> Self {
        Argb(v)
    }
}

impl From<Argb> for u32 {
    fn from(px: Argb) -> Self {
        px.0
    }
}

/// Convert RGBA8 bytes into packed pixels. Trailing bytes that do not form a
/// whole pixel are ignored.
pub fn argb_from_rgba_bytes(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|px| Argb::from_rgba([px[0], px[1], px[2], px[3]]).0)
        .collect()
}

/// Convert packed pixels into RGBA8 bytes.
pub fn rgba_bytes_from_argb(pixels: &[u32]) -> Vec<u8> {
    pixels.iter().flat_map(|&p| Argb(p).to_rgba()).collect()
}
