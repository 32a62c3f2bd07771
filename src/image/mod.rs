//! Image loading, enhancement, and saving utilities.

mod enhance;
mod load;
mod save;

pub use enhance::{scaled_dimensions, sharpen, upscale};
pub use load::load_image;
pub use save::{save_image, OutputFormat};

/// Upscale factor applied to both width and height.
pub const DEFAULT_SCALE_FACTOR: u32 = 2;

/// Sharpness enhancement factor. 1.0 leaves the image unchanged.
pub const DEFAULT_SHARPNESS: f32 = 1.5;

/// Encoder quality requested when saving (1-100).
pub const DEFAULT_QUALITY: u8 = 100;
