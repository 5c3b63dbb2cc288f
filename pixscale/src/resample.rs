//! The two host-facing scale operations.
//!
//! Both read a region of a host image into a padded scratch buffer, scale it
//! into a freshly allocated destination and hand the destination to the host
//! as a new image. Every buffer is owned by the call, so an early return
//! releases whatever was allocated so far and leaves the placeholder unbound.

use tracing::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::error::ScaleError;
use crate::geom::{Extent, Rect};
use crate::host::{ImageHandle, ImageHost};
use crate::scale::{checked_source, scale_into, EdgePadded, ScaleSize, ScaleType};

/// Scale `source` (or the `rect` part of it) to `width × height` and bind the
/// result to `placeholder`.
///
/// Returns the size of the new image.
pub fn scale_image<H: ImageHost + ?Sized>(
    host: &mut H,
    source: ImageHandle,
    rect: Option<Rect>,
    placeholder: ImageHandle,
    width: u32,
    height: u32,
    scale_type: ScaleType,
) -> Result<Extent, ScaleError> {
    scale_with_host(
        host,
        source,
        rect,
        placeholder,
        ScaleSize::Explicit { width, height },
        scale_type,
    )
}

/// Scale `source` (or the `rect` part of it) by a uniform `factor` and bind
/// the result to `placeholder`.
///
/// The factor is truncated to 16.16 fixed point; the new width is
/// `(width * floor(factor * 65536)) >> 16`, likewise the height.
pub fn scale_image_proportionally<H: ImageHost + ?Sized>(
    host: &mut H,
    source: ImageHandle,
    rect: Option<Rect>,
    placeholder: ImageHandle,
    factor: f64,
    scale_type: ScaleType,
) -> Result<Extent, ScaleError> {
    scale_with_host(
        host,
        source,
        rect,
        placeholder,
        ScaleSize::Factor(factor),
        scale_type,
    )
}

/// Shared implementation of [`scale_image`] and [`scale_image_proportionally`].
pub fn scale_with_host<H: ImageHost + ?Sized>(
    host: &mut H,
    source: ImageHandle,
    rect: Option<Rect>,
    placeholder: ImageHandle,
    size: ScaleSize,
    scale_type: ScaleType,
) -> Result<Extent, ScaleError> {
    let result = run(host, source, rect, placeholder, size, scale_type);
    match &result {
        Ok(extent) => debug!(
            %source,
            %placeholder,
            %scale_type,
            width = extent.width,
            height = extent.height,
            "scaled image"
        ),
        Err(err) => warn!(%source, %placeholder, %scale_type, error = %err, "image scale failed"),
    }
    result
}

fn run<H: ImageHost + ?Sized>(
    host: &mut H,
    source: ImageHandle,
    rect: Option<Rect>,
    placeholder: ImageHandle,
    size: ScaleSize,
    scale_type: ScaleType,
) -> Result<Extent, ScaleError> {
    let image = host.image_size(source)?;
    let region = rect.unwrap_or(Rect::full(image));
    if !region.fits_within(image) {
        return Err(ScaleError::InvalidRect {
            rect: region,
            extent: image,
        });
    }
    checked_source(region.extent())?;
    let target = size.resolve(region.extent())?;

    let scratch_len = EdgePadded::required_len(region.width, region.height)
        .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
    let mut padded = EdgePadded::from_vec(region.width, region.height, host.allocate(scratch_len)?)?;
    let pitch = padded.pitch() as usize;
    host.read_pixels(source, region, padded.buf_mut(), pitch)?;
    if scale_type.needs_edge_padding() {
        padded.replicate_edges();
    }

    let dst_len = (target.width as usize)
        .checked_mul(target.height as usize)
        .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
    let storage = host.allocate(dst_len)?;
    let mut dst = PixelBuffer::try_from_buf(target.width, target.height, target.width, storage)?;
    scale_into(&mut dst, &padded, scale_type);
    drop(padded);

    host.create_image_raw(placeholder, dst)?;
    Ok(target)
}
