/// Behavioural tests of the scale operations through an in-memory host.
use std::collections::HashSet;

use pixscale::scale::{scale_buffer, ScaleSize, ScaleType, MAX_DIMENSION};
use pixscale::{
    scale_image, scale_image_proportionally, Argb, Extent, ImageHandle, ImageHost, MemoryHost, PixelBuffer,
    Rect, ScaleError,
};

const RED: u32 = 0xffff_0000;
const GREEN: u32 = 0xff00_ff00;
const BLUE: u32 = 0xff00_00ff;
const WHITE: u32 = 0xffff_ffff;

/// Deterministic pseudo-random pixels.
fn noise(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let buf = (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        })
        .collect();
    PixelBuffer::from_buf(width, height, width, buf)
}

fn quad_2x2() -> PixelBuffer {
    PixelBuffer::from_buf(2, 2, 2, vec![RED, GREEN, BLUE, WHITE])
}

/// How [`FaultyHost`] misbehaves.
#[derive(Clone, Copy)]
enum Fault {
    /// `create_image_raw` reports out-of-memory.
    RefuseImage,
    /// The second `allocate` (the destination) returns half the pixels asked for.
    ShortDestination,
}

/// A `MemoryHost` with one injected failure.
struct FaultyHost {
    inner: MemoryHost,
    fault: Fault,
    allocations: usize,
}

impl FaultyHost {
    fn new(fault: Fault) -> Self {
        Self {
            inner: MemoryHost::new(),
            fault,
            allocations: 0,
        }
    }
}

impl ImageHost for FaultyHost {
    fn image_size(&self, image: ImageHandle) -> Result<Extent, ScaleError> {
        self.inner.image_size(image)
    }

    fn read_pixels(&self, image: ImageHandle, rect: Rect, dst: &mut [u32], pitch: usize) -> Result<(), ScaleError> {
        self.inner.read_pixels(image, rect, dst, pitch)
    }

    fn allocate(&mut self, len: usize) -> Result<Vec<u32>, ScaleError> {
        self.allocations += 1;
        match self.fault {
            Fault::ShortDestination if self.allocations == 2 => self.inner.allocate(len / 2),
            _ => self.inner.allocate(len),
        }
    }

    fn create_image_raw(&mut self, placeholder: ImageHandle, pixels: PixelBuffer) -> Result<(), ScaleError> {
        match self.fault {
            Fault::RefuseImage => Err(ScaleError::OutOfMemory {
                requested: pixels.byte_len(),
            }),
            Fault::ShortDestination => self.inner.create_image_raw(placeholder, pixels),
        }
    }
}

/// Straightforward per-pixel nearest neighbour with accumulated positions.
fn reference_nearest(src: &PixelBuffer, dw: u32, dh: u32) -> Vec<u32> {
    let deltax = (src.width << 16) / dw;
    let deltay = (src.height << 16) / dh;
    let mut out = Vec::new();
    let mut v = 0u32;
    for _ in 0..dh {
        let mut u = 0u32;
        for _ in 0..dw {
            out.push(src.get(u >> 16, v >> 16));
            u += deltax;
        }
        v += deltay;
    }
    out
}

#[test]
fn produced_buffers_have_requested_dimensions() {
    let src = noise(13, 7, 1);
    for (w, h) in [(1, 1), (13, 7), (26, 14), (5, 3), (1, 40), (40, 1), (17, 23)] {
        for scale_type in [ScaleType::NearestNeighbour, ScaleType::Bilinear] {
            let out = scale_buffer(&src, ScaleSize::Explicit { width: w, height: h }, scale_type).unwrap();
            assert_eq!((out.width, out.height, out.pitch), (w, h, w));
            assert_eq!(out.buf.len(), (w * h) as usize);
        }
    }
}

#[test]
fn scale_factor_uses_integer_arithmetic() {
    let mut host = MemoryHost::new();
    let src = host.add_image(PixelBuffer::new(100, 37));
    for factor in [0.5, 0.3, 1.0 / 3.0, 1.7, 2.0, 0.999_99] {
        let dst = host.create_placeholder();
        let ext = scale_image_proportionally(&mut host, src, None, dst, factor, ScaleType::NearestNeighbour)
            .unwrap();
        let fixed = (factor * 65536.0) as u64;
        assert_eq!(ext, Extent::new(((100 * fixed) >> 16) as u32, ((37 * fixed) >> 16) as u32));
        assert_eq!(host.image(dst).unwrap().width, ext.width);
    }

    let dst = host.create_placeholder();
    let ext = scale_image_proportionally(&mut host, src, None, dst, 0.5, ScaleType::Bilinear).unwrap();
    assert_eq!(ext, Extent::new(50, 18));
}

#[test]
fn nearest_same_size_is_identity() {
    let src = noise(31, 17, 2);
    let out = scale_buffer(&src, ScaleSize::Explicit { width: 31, height: 17 }, ScaleType::NearestNeighbour)
        .unwrap();
    assert_eq!(out.buf, src.buf);
}

#[test]
fn nearest_matches_accumulating_reference() {
    let src = noise(19, 11, 3);
    for (w, h) in [(7, 5), (19, 11), (50, 3), (3, 50), (64, 64)] {
        let out = scale_buffer(&src, ScaleSize::Explicit { width: w, height: h }, ScaleType::NearestNeighbour)
            .unwrap();
        assert_eq!(out.buf, reference_nearest(&src, w, h), "{w}x{h}");
    }
}

#[test]
fn nearest_never_synthesizes_colours() {
    let src = noise(9, 6, 4);
    let palette: HashSet<u32> = src.buf.iter().copied().collect();
    for (w, h) in [(4, 4), (23, 5), (9, 6), (100, 71)] {
        let out = scale_buffer(&src, ScaleSize::Explicit { width: w, height: h }, ScaleType::NearestNeighbour)
            .unwrap();
        assert!(out.buf.iter().all(|p| palette.contains(p)), "{w}x{h}");
    }
}

#[test]
fn bilinear_uniform_colour_is_preserved() {
    for colour in [0x0000_0000, 0xffff_ffff, 0x80ff_0001, 0x7f7f_7f7f, 0x0102_0304] {
        let src = PixelBuffer::from_buf(5, 4, 5, vec![colour; 20]);
        for (w, h) in [(1, 1), (3, 2), (5, 4), (11, 9), (37, 2)] {
            let out = scale_buffer(&src, ScaleSize::Explicit { width: w, height: h }, ScaleType::Bilinear)
                .unwrap();
            assert!(out.buf.iter().all(|&p| p == colour), "{colour:#010x} at {w}x{h}");
        }
    }
}

#[test]
fn bilinear_upsampled_gradient_is_monotonic() {
    let width = 8;
    let buf = (0..width * 3)
        .map(|i| Argb::new(((i % width) * 30) as u8, 10, 200, 255).0)
        .collect();
    let src = PixelBuffer::from_buf(width, 3, width, buf);
    let out = scale_buffer(&src, ScaleSize::Explicit { width: 29, height: 7 }, ScaleType::Bilinear).unwrap();
    for row in out.rows() {
        let reds: Vec<u8> = row.iter().map(|&p| Argb(p).red()).collect();
        assert!(reds.windows(2).all(|w| w[0] <= w[1]), "{reds:?}");
        assert_eq!(reds[0], 0);
    }
}

#[test]
fn bilinear_edge_reads_replicated_padding() {
    // Only the bottom-right pixel carries the sentinel; the extreme output
    // corner samples it together with the replicated column, row and corner.
    let sentinel = 0x80c0_ffee;
    let src = PixelBuffer::from_buf(2, 2, 2, vec![0xff00_0000, 0xff00_0000, 0xff00_0000, sentinel]);
    let mut host = MemoryHost::new();
    let image = host.add_image(src);
    let dst = host.create_placeholder();
    scale_image(&mut host, image, None, dst, 5, 5, ScaleType::Bilinear).unwrap();
    let out = host.image(dst).unwrap();
    assert_eq!(out.get(4, 4), sentinel);
    assert_eq!(Argb(out.get(4, 0)).alpha(), 0xff);
}

#[test]
fn allocation_failure_binds_nothing() {
    let mut host = MemoryHost::new().with_memory_limit(4096);
    let src = host.add_image(noise(8, 8, 5));
    let dst = host.create_placeholder();

    let err = scale_image(&mut host, src, None, dst, 1000, 1000, ScaleType::Bilinear).unwrap_err();
    assert!(err.is_out_of_memory());
    assert!(!host.is_bound(dst));
    assert_eq!(host.bytes_in_use(), 256);

    // A wide destination is a valid request that simply does not fit.
    let err = scale_image(&mut host, src, None, dst, MAX_DIMENSION + 1, 4, ScaleType::Bilinear).unwrap_err();
    assert!(err.is_out_of_memory());
    assert!(!host.is_bound(dst));

    // A zero size is rejected before allocating.
    let err = scale_image(&mut host, src, None, dst, 0, 4, ScaleType::Bilinear).unwrap_err();
    assert!(!err.is_out_of_memory());
    assert!(!host.is_bound(dst));

    // A smaller retry succeeds.
    scale_image(&mut host, src, None, dst, 16, 16, ScaleType::Bilinear).unwrap();
    assert!(host.is_bound(dst));
}

#[test]
fn scratch_allocation_failure_binds_nothing() {
    // 256 bytes of source plus a 9x9 padded copy overruns the budget before
    // any destination is requested.
    let mut host = MemoryHost::new().with_memory_limit(400);
    let src = host.add_image(noise(8, 8, 6));
    let dst = host.create_placeholder();

    for scale_type in [ScaleType::NearestNeighbour, ScaleType::Bilinear] {
        let err = scale_image(&mut host, src, None, dst, 2, 2, scale_type).unwrap_err();
        assert_eq!(err, ScaleError::OutOfMemory { requested: 324 });
        assert!(!host.is_bound(dst));
        assert_eq!(host.bytes_in_use(), 256);
    }
}

#[test]
fn refused_image_creation_binds_nothing() {
    let mut host = FaultyHost::new(Fault::RefuseImage);
    let src = host.inner.add_image(quad_2x2());
    let dst = host.inner.create_placeholder();

    let err = scale_image(&mut host, src, None, dst, 4, 4, ScaleType::Bilinear).unwrap_err();
    assert_eq!(err, ScaleError::OutOfMemory { requested: 64 });
    assert!(!host.inner.is_bound(dst));

    let err = scale_image_proportionally(&mut host, src, None, dst, 2.0, ScaleType::NearestNeighbour).unwrap_err();
    assert!(err.is_out_of_memory());
    assert!(!host.inner.is_bound(dst));
    assert_eq!(host.inner.bound_images(), 1);
}

#[test]
fn short_destination_storage_is_an_error() {
    let mut host = FaultyHost::new(Fault::ShortDestination);
    let src = host.inner.add_image(quad_2x2());
    let dst = host.inner.create_placeholder();

    let err = scale_image(&mut host, src, None, dst, 4, 4, ScaleType::NearestNeighbour).unwrap_err();
    assert_eq!(err, ScaleError::BufferTooSmall { expected: 16, actual: 8 });
    assert!(!host.inner.is_bound(dst));
}

#[test]
fn destination_wider_than_source_range() {
    let mut host = MemoryHost::new();
    let src = host.add_image(quad_2x2());
    for scale_type in [ScaleType::NearestNeighbour, ScaleType::Bilinear] {
        let dst = host.create_placeholder();
        let ext = scale_image(&mut host, src, None, dst, 70_000, 1, scale_type).unwrap();
        assert_eq!(ext, Extent::new(70_000, 1));
        let out = host.image(dst).unwrap();
        assert_eq!(out.buf.len(), 70_000);
        assert_eq!(out.get(0, 0), RED);
        // The step truncates to 1/65536, so column 65536 onward samples the
        // right-hand source column.
        assert!(out.row(0)[65_536..].iter().all(|&p| p == GREEN), "{scale_type}");
    }
}

#[test]
fn nearest_2x2_to_4x4_fills_quadrants() {
    let out = scale_buffer(&quad_2x2(), ScaleSize::Explicit { width: 4, height: 4 }, ScaleType::NearestNeighbour)
        .unwrap();
    #[rustfmt::skip]
    let expected = vec![
        RED, RED, GREEN, GREEN,
        RED, RED, GREEN, GREEN,
        BLUE, BLUE, WHITE, WHITE,
        BLUE, BLUE, WHITE, WHITE,
    ];
    assert_eq!(out.buf, expected);
}

#[test]
fn bilinear_half_pixel_is_average_of_corners() {
    // Destination (1, 1) of a 4x4 upscale sits at source position (0.5, 0.5).
    let out = scale_buffer(&quad_2x2(), ScaleSize::Explicit { width: 4, height: 4 }, ScaleType::Bilinear).unwrap();
    let px = Argb(out.get(1, 1));
    let corners = [RED, GREEN, BLUE, WHITE].map(Argb);
    let avg = |ch: fn(Argb) -> u8| corners.iter().map(|&c| ch(c) as f64).sum::<f64>() / 4.0;
    for ch in [Argb::red, Argb::green, Argb::blue, Argb::alpha] {
        assert!((ch(px) as f64 - avg(ch)).abs() <= 1.0);
    }
}

#[test]
fn bilinear_2x2_to_3x3_centre() {
    // The centre samples source position (2/3, 2/3), so the right-hand and
    // bottom samples weigh twice as much as the left-hand and top ones.
    let out = scale_buffer(&quad_2x2(), ScaleSize::Explicit { width: 3, height: 3 }, ScaleType::Bilinear).unwrap();
    assert_eq!(out.get(0, 0), RED);
    assert_eq!(Argb(out.get(1, 1)), Argb::new(141, 170, 169, 255));
}

#[test]
fn sub_rectangle_is_scaled_on_its_own() {
    let mut host = MemoryHost::new();
    let mut img = PixelBuffer::new(6, 6);
    for y in 2..4 {
        for x in 3..5 {
            img.set(x, y, GREEN);
        }
    }
    let src = host.add_image(img);
    let dst = host.create_placeholder();
    let ext = scale_image_proportionally(&mut host, src, Some(Rect::new(3, 2, 2, 2)), dst, 4.0, ScaleType::Bilinear)
        .unwrap();
    assert_eq!(ext, Extent::new(8, 8));
    assert!(host.image(dst).unwrap().buf.iter().all(|&p| p == GREEN));
}
