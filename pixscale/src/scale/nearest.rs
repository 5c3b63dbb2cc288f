use super::fixed::{step, whole};
use super::for_each_row;
use crate::buffer::PixelBuffer;

/// Nearest-neighbour scale of `src` into `dst`.
///
/// Every destination pixel is a verbatim copy of the source pixel at
/// `(u >> 16, v >> 16)`, where `u` and `v` advance by `(sw << 16) / dw` and
/// `(sh << 16) / dh` per destination column and row. No padding is read.
pub fn nearest_neighbour_scale(dst: &mut PixelBuffer, src: &PixelBuffer) {
    if dst.width == 0 || dst.height == 0 {
        return;
    }
    let deltax = step(src.width, dst.width);
    let deltay = step(src.height, dst.height);
    let spitch = src.pitch as usize;

    for_each_row(dst, deltay, |row, v| {
        let scan = &src.buf[whole(v) * spitch..];
        nearest_row(row, scan, deltax);
    });
}

/// Fill one destination row, four pixels per iteration.
#[inline]
fn nearest_row(dst: &mut [u32], scan: &[u32], deltax: u32) {
    let mut u = 0u32;
    let mut quads = dst.chunks_exact_mut(4);
    for quad in &mut quads {
        quad[0] = scan[whole(u)];
        u += deltax;
        quad[1] = scan[whole(u)];
        u += deltax;
        quad[2] = scan[whole(u)];
        u += deltax;
        quad[3] = scan[whole(u)];
        u += deltax;
    }
    for px in quads.into_remainder() {
        *px = scan[whole(u)];
        u += deltax;
    }
}
