//! Download, enhance, save and clean up in one run.

mod routine;

pub use routine::{Config, Pipeline, Report};

/// Image fetched when no URL is given.
pub const DEFAULT_SOURCE_URL: &str = "https://i.imgur.com/kXJpZld.png";

/// Output written when no path is given.
pub const DEFAULT_OUTPUT_PATH: &str = "logo.png";

/// Scratch file name, placed next to the output unless overridden.
pub const DEFAULT_TEMP_NAME: &str = "temp_logo.png";
