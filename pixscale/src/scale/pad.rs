use crate::buffer::{try_alloc_pixels, PixelBuffer};
use crate::error::ScaleError;

/// A source copy with one spare column and one spare row.
///
/// The logical size is `width × height`; the pitch is `width + 1` and the
/// storage holds `height + 1` rows, so reads at `x + 1` and `y + 1` stay in
/// bounds for every real pixel.
#[derive(Debug, Clone)]
pub struct EdgePadded {
    buffer: PixelBuffer,
}

impl EdgePadded {
    /// Number of pixels needed to hold a padded `width × height` image.
    pub fn required_len(width: u32, height: u32) -> Option<usize> {
        (width as usize + 1).checked_mul(height as usize + 1)
    }

    /// Allocate a zeroed padded buffer.
    pub fn try_new(width: u32, height: u32) -> Result<Self, ScaleError> {
        let len = Self::required_len(width, height)
            .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
        Self::from_vec(width, height, try_alloc_pixels(len)?)
    }

    /// Wrap storage obtained elsewhere, e.g. from an [`ImageHost`](crate::host::ImageHost).
    pub fn from_vec(width: u32, height: u32, buf: Vec<u32>) -> Result<Self, ScaleError> {
        let expected = Self::required_len(width, height)
            .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
        if buf.len() < expected {
            return Err(ScaleError::BufferTooSmall {
                expected,
                actual: buf.len(),
            });
        }
        Ok(Self {
            buffer: PixelBuffer::from_buf(width, height, width + 1, buf),
        })
    }

    /// Copy the logical pixels of `src` into a fresh padded buffer.
    ///
    /// The padding is left zeroed; call [`replicate_edges`](Self::replicate_edges)
    /// before bilinear sampling.
    pub fn copy_from(src: &PixelBuffer) -> Result<Self, ScaleError> {
        let mut padded = Self::try_new(src.width, src.height)?;
        let pitch = padded.pitch() as usize;
        let width = src.width as usize;
        for (y, row) in src.rows().enumerate() {
            padded.buf_mut()[y * pitch..y * pitch + width].copy_from_slice(row);
        }
        Ok(padded)
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn pitch(&self) -> u32 {
        self.buffer.pitch
    }

    /// The logical image; its storage extends one row past `height`.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buf(&self) -> &[u32] {
        &self.buffer.buf
    }

    pub fn buf_mut(&mut self) -> &mut [u32] {
        &mut self.buffer.buf
    }

    /// Fill the spare column with the last real column, then the spare row
    /// (corner included) with the last real row.
    pub fn replicate_edges(&mut self) {
        let w = self.width() as usize;
        let h = self.height() as usize;
        if w == 0 || h == 0 {
            return;
        }
        let pitch = self.pitch() as usize;
        let buf = &mut self.buffer.buf;

        for j in 0..h {
            buf[w + pitch * j] = buf[(w - 1) + pitch * j];
        }

        let last = pitch * (h - 1);
        buf.copy_within(last..last + pitch, pitch * h);
    }
}
