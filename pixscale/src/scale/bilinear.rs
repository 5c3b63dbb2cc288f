use super::fixed::{step, whole, FIXED_SHIFT, FRACTION_MASK};
use super::for_each_row;
use super::pad::EdgePadded;
use crate::buffer::PixelBuffer;
use crate::pixel::Argb;

const ONE: i32 = FRACTION_MASK as i32;
/// Half a unit in 16.16, added before truncating a horizontal blend.
const ROUNDING: i32 = 1 << (FIXED_SHIFT - 1);

/// Bilinear scale of a padded source into `dst`.
///
/// For each destination pixel at 16.16 position `(u, v)` the left-hand
/// samples get weight `frac_x = 0xffff - (u & 0xffff)` and the right-hand
/// samples `0xffff - frac_x`; the two horizontal blends are then mixed
/// vertically by `frac_y = v & 0xffff`. Channels are blended independently.
///
/// Reads one column and one row past the logical size, so `src` must have had
/// [`EdgePadded::replicate_edges`] applied.
pub fn bilinear_scale(dst: &mut PixelBuffer, src: &EdgePadded) {
    if dst.width == 0 || dst.height == 0 {
        return;
    }
    let deltax = step(src.width(), dst.width);
    let deltay = step(src.height(), dst.height);
    let spitch = src.pitch() as usize;
    let buf = src.buf();

    for_each_row(dst, deltay, |row, v| {
        let start = whole(v) * spitch;
        let top = &buf[start..start + spitch];
        let bottom = &buf[start + spitch..start + 2 * spitch];
        bilinear_row(row, top, bottom, deltax, (v & FRACTION_MASK) as i32);
    });
}

#[inline]
fn bilinear_row(dst: &mut [u32], top: &[u32], bottom: &[u32], deltax: u32, frac_y: i32) {
    let mut u = 0u32;
    for px in dst.iter_mut() {
        let pos = whole(u);
        let frac_x = ONE - (u & FRACTION_MASK) as i32;

        let tl = Argb(top[pos]);
        let tr = Argb(top[pos + 1]);
        let bl = Argb(bottom[pos]);
        let br = Argb(bottom[pos + 1]);

        let blend = |ch: fn(Argb) -> u8| {
            let t = horizontal(ch(tl), ch(tr), frac_x);
            let b = horizontal(ch(bl), ch(br), frac_x);
            t + (((b - t) * frac_y) >> FIXED_SHIFT)
        };

        *px = Argb::from_wide(
            blend(Argb::red),
            blend(Argb::green),
            blend(Argb::blue),
            blend(Argb::alpha),
        )
        .0;
        u += deltax;
    }
}

/// Weighted mix of two samples whose weights sum to `0xffff`.
///
/// Unlike a bare `>> 16` this adds [`ROUNDING`] first, so a uniform pair comes
/// back unchanged. Non-uniform results can be one higher than the bare shift.
#[inline]
fn horizontal(left: u8, right: u8, frac_x: i32) -> i32 {
    (left as i32 * frac_x + right as i32 * (ONE - frac_x) + ROUNDING) >> FIXED_SHIFT
}
