use std::collections::BTreeMap;

use super::{copy_region, ImageHandle, ImageHost};
use crate::buffer::{try_alloc_pixels, PixelBuffer};
use crate::error::ScaleError;
use crate::geom::{Extent, Rect};

const PIXEL_BYTES: usize = std::mem::size_of::<u32>();

/// In-process image store.
///
/// Handles start at 1. A handle is either bound to an image or reserved as a
/// placeholder waiting for [`ImageHost::create_image_raw`]. An optional byte
/// budget covers bound images; allocations and new images that would exceed it
/// report [`ScaleError::OutOfMemory`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    slots: BTreeMap<ImageHandle, Option<PixelBuffer>>,
    next_handle: u32,
    memory_limit: Option<usize>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the bytes held by bound images plus any single allocation.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    fn next(&mut self) -> ImageHandle {
        self.next_handle += 1;
        ImageHandle(self.next_handle)
    }

    /// Store an image and return its handle. Bypasses the memory budget.
    pub fn add_image(&mut self, image: PixelBuffer) -> ImageHandle {
        let handle = self.next();
        self.slots.insert(handle, Some(image));
        handle
    }

    /// Reserve a handle with no image bound to it.
    pub fn create_placeholder(&mut self) -> ImageHandle {
        let handle = self.next();
        self.slots.insert(handle, None);
        handle
    }

    /// The image bound to `handle`, if any.
    pub fn image(&self, handle: ImageHandle) -> Option<&PixelBuffer> {
        self.slots.get(&handle).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, handle: ImageHandle) -> bool {
        self.image(handle).is_some()
    }

    /// Release a handle, returning its image if one was bound.
    pub fn remove(&mut self, handle: ImageHandle) -> Option<PixelBuffer> {
        self.slots.remove(&handle).flatten()
    }

    /// Number of handles with an image bound.
    pub fn bound_images(&self) -> usize {
        self.slots.values().filter(|s| s.is_some()).count()
    }

    /// Bytes held by bound images.
    pub fn bytes_in_use(&self) -> usize {
        self.slots
            .values()
            .flatten()
            .map(PixelBuffer::byte_len)
            .sum()
    }

    fn check_budget(&self, bytes: usize) -> Result<(), ScaleError> {
        if let Some(limit) = self.memory_limit {
            let total = self.bytes_in_use().saturating_add(bytes);
            if total > limit {
                return Err(ScaleError::OutOfMemory { requested: bytes });
            }
        }
        Ok(())
    }
}

impl ImageHost for MemoryHost {
    fn image_size(&self, image: ImageHandle) -> Result<Extent, ScaleError> {
        self.image(image)
            .map(|img| Extent::new(img.width, img.height))
            .ok_or(ScaleError::UnknownImage(image))
    }

    fn read_pixels(
        &self,
        image: ImageHandle,
        rect: Rect,
        dst: &mut [u32],
        pitch: usize,
    ) -> Result<(), ScaleError> {
        let src = self.image(image).ok_or(ScaleError::UnknownImage(image))?;
        copy_region(src, rect, dst, pitch)
    }

    fn allocate(&mut self, len: usize) -> Result<Vec<u32>, ScaleError> {
        self.check_budget(len.saturating_mul(PIXEL_BYTES))?;
        try_alloc_pixels(len)
    }

    fn create_image_raw(
        &mut self,
        placeholder: ImageHandle,
        pixels: PixelBuffer,
    ) -> Result<(), ScaleError> {
        if !self.slots.contains_key(&placeholder) {
            return Err(ScaleError::UnknownImage(placeholder));
        }
        // Rebinding releases the old image first.
        let previous = self.slots.insert(placeholder, None).flatten();
        if let Err(err) = self.check_budget(pixels.byte_len()) {
            self.slots.insert(placeholder, previous);
            return Err(err);
        }
        self.slots.insert(placeholder, Some(pixels));
        Ok(())
    }
}
