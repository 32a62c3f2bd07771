//! # `logo-enhance`
//!
//! Download an image, upscale it 2x with Lanczos resampling, sharpen it, and
//! save it as PNG.
//!
//! The run is strictly sequential: download to a scratch file, decode,
//! resize, sharpen, save, then delete the scratch file. Any failure aborts
//! the run.
//!
//! ## Example
//!
//! ```no_run
//! use logo_enhance::{Config, Pipeline};
//!
//! # fn main() -> logo_enhance::Result<()> {
//! let config = Config::for_output("public/logo.png");
//! let pipeline = Pipeline::new(config)?;
//!
//! let report = pipeline.run()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod image;
pub mod pipeline;

#[cfg(test)]
mod test_util;

pub use error::{Error, Result};
pub use image::OutputFormat;
pub use pipeline::{Config, Pipeline, Report};
