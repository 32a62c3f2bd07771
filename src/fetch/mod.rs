//! Fetching the source image over HTTP.

mod download;

pub use download::{build_client, download_file};

/// Suffix appended to the destination while a download is in flight.
pub const PART_SUFFIX: &str = "part";
