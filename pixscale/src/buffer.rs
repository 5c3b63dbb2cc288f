use crate::error::ScaleError;

/// Row-major buffer of packed ARGB pixels.
///
/// `pitch` is the distance in pixels between the starts of two rows and may
/// exceed `width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub buf: Vec<u32>,
}

impl PixelBuffer {
    /// Create a new buffer filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        let pitch = width;
        let buf = vec![0u32; pitch as usize * height as usize];
        Self { width, height, pitch, buf }
    }

    /// Create a buffer from existing pixel data.
    ///
    /// `pitch` must be >= `width`, and `buf` must contain at least `pitch * height` pixels.
    pub fn from_buf(width: u32, height: u32, pitch: u32, buf: Vec<u32>) -> Self {
        assert!(pitch >= width);
        assert!(buf.len() >= pitch as usize * height as usize);
        Self { width, height, pitch, buf }
    }

    /// Like [`from_buf`](Self::from_buf), but reports a short `buf` or a
    /// narrow `pitch` as an error instead of panicking.
    pub fn try_from_buf(width: u32, height: u32, pitch: u32, buf: Vec<u32>) -> Result<Self, ScaleError> {
        if pitch < width {
            return Err(ScaleError::InvalidDimensions {
                width: width as u64,
                height: height as u64,
            });
        }
        let expected = (pitch as usize)
            .checked_mul(height as usize)
            .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
        if buf.len() < expected {
            return Err(ScaleError::BufferTooSmall {
                expected,
                actual: buf.len(),
            });
        }
        Ok(Self { width, height, pitch, buf })
    }

    /// Allocate a zeroed buffer, reporting allocation failure instead of aborting.
    pub fn try_new(width: u32, height: u32, pitch: u32) -> Result<Self, ScaleError> {
        if pitch < width {
            return Err(ScaleError::InvalidDimensions {
                width: width as u64,
                height: height as u64,
            });
        }
        let len = (pitch as usize)
            .checked_mul(height as usize)
            .ok_or(ScaleError::OutOfMemory { requested: usize::MAX })?;
        let buf = try_alloc_pixels(len)?;
        Ok(Self { width, height, pitch, buf })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.buf[(y * self.pitch + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u32) {
        self.buf[(y * self.pitch + x) as usize] = val;
    }

    /// The `width` pixels of row `y`, without pitch padding.
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.pitch as usize;
        &self.buf[start..start + self.width as usize]
    }

    /// Iterate over the logical rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Copy the logical pixels into a tightly packed vector.
    pub fn to_packed(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Size of the backing storage in bytes.
    pub fn byte_len(&self) -> usize {
        self.buf.len() * std::mem::size_of::<u32>()
    }
}

/// Allocate `len` zeroed pixels, returning `OutOfMemory` if the allocator refuses.
pub fn try_alloc_pixels(len: usize) -> Result<Vec<u32>, ScaleError> {
    let requested = len.saturating_mul(std::mem::size_of::<u32>());
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ScaleError::OutOfMemory { requested })?;
    buf.resize(len, 0);
    Ok(buf)
}
