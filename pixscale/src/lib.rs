pub mod error;
pub mod pixel;
pub mod geom;
pub mod buffer;
#[allow(clippy::needless_range_loop)]
pub mod scale;
pub mod host;
pub mod resample;
#[cfg(feature = "serde")]
pub mod config;

pub use buffer::PixelBuffer;
pub use error::ScaleError;
pub use geom::{Extent, Rect};
pub use host::{ImageHandle, ImageHost, MemoryHost};
pub use pixel::Argb;
pub use resample::{scale_image, scale_image_proportionally};
pub use scale::{ScaleSize, ScaleType};
