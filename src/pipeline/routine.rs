//! The fetch-transform-save routine.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{Error, Result};
use crate::fetch;
use crate::image::{self, OutputFormat, DEFAULT_QUALITY, DEFAULT_SCALE_FACTOR, DEFAULT_SHARPNESS};

use super::{DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_URL, DEFAULT_TEMP_NAME};

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the image to download.
    pub source_url: String,

    /// Where the enhanced image is written.
    pub output_path: PathBuf,

    /// Scratch location for the download. Removed after a successful run.
    pub temp_path: PathBuf,

    /// Integer upscale factor for width and height.
    pub scale_factor: u32,

    /// Sharpness factor (1.0 = unchanged, >1.0 = sharper).
    pub sharpness: f32,

    /// Encoder quality (1-100).
    pub output_quality: u8,

    /// Output encoding.
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_output(DEFAULT_OUTPUT_PATH)
    }
}

impl Config {
    /// Default configuration writing to `output_path`, with the scratch file
    /// placed in the same directory.
    #[must_use]
    pub fn for_output<P: Into<PathBuf>>(output_path: P) -> Self {
        let output_path = output_path.into();
        let temp_path = output_path.with_file_name(DEFAULT_TEMP_NAME);

        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_path,
            temp_path,
            scale_factor: DEFAULT_SCALE_FACTOR,
            sharpness: DEFAULT_SHARPNESS,
            output_quality: DEFAULT_QUALITY,
            output_format: OutputFormat::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source_url).map_err(|e| Error::InvalidParameter {
            name: "source_url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidParameter {
                name: "source_url".to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        if self.scale_factor == 0 {
            return Err(Error::InvalidParameter {
                name: "scale_factor".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if !self.sharpness.is_finite() || self.sharpness < 0.0 {
            return Err(Error::InvalidParameter {
                name: "sharpness".to_string(),
                reason: "must be a finite value >= 0.0".to_string(),
            });
        }

        if !(1..=100).contains(&self.output_quality) {
            return Err(Error::InvalidParameter {
                name: "output_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        if self.temp_path == self.output_path {
            return Err(Error::InvalidParameter {
                name: "temp_path".to_string(),
                reason: "must differ from the output path".to_string(),
            });
        }

        Ok(())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub output_path: PathBuf,
    /// Dimensions of the downloaded image.
    pub original: (u32, u32),
    /// Dimensions of the saved image.
    pub resized: (u32, u32),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully downloaded and enhanced logo to {}. Original size: {}x{}, New size: {}x{}",
            self.output_path.display(),
            self.original.0,
            self.original.1,
            self.resized.0,
            self.resized.1
        )
    }
}

/// Downloads an image, upscales and sharpens it, and saves the result.
pub struct Pipeline {
    config: Config,
    client: Client,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing pipeline with config: {config:?}");

        let client = fetch::build_client()?;

        Ok(Self { config, client })
    }

    /// Run every step: download, decode, resize, sharpen, save, clean up.
    ///
    /// Any failure aborts the run. A failed download leaves neither the
    /// scratch file nor the output behind. If the scratch file cannot be
    /// removed at the end, that is reported as an error even though the
    /// output was written.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn run(&self) -> Result<Report> {
        self.fetch()?;

        let report = self.enhance_file(&self.config.temp_path, &self.config.output_path)?;

        remove_scratch(&self.config.temp_path)?;

        tracing::info!("Processing complete");
        Ok(report)
    }

    /// Download the source image to the scratch path.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub fn fetch(&self) -> Result<()> {
        fetch::download_file(&self.client, &self.config.source_url, &self.config.temp_path)?;
        Ok(())
    }

    /// Decode `input_path`, upscale and sharpen it, and write `output_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be decoded or the output cannot
    /// be written.
    pub fn enhance_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<Report> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        tracing::info!("Processing image: {}", input_path.display());
        let (img, original) = image::load_image(input_path)?;

        tracing::info!("Upscaling {}x...", self.config.scale_factor);
        let resized = image::upscale(&img, self.config.scale_factor)?;
        drop(img);

        tracing::info!("Sharpening (factor {})...", self.config.sharpness);
        let enhanced = image::sharpen(&resized, self.config.sharpness);
        drop(resized);

        tracing::info!("Saving output to: {}", output_path.display());
        image::save_image(
            &enhanced,
            output_path,
            self.config.output_format,
            self.config.output_quality,
        )?;

        Ok(Report {
            output_path: output_path.to_path_buf(),
            original,
            resized: (enhanced.width(), enhanced.height()),
        })
    }
}

fn remove_scratch(path: &Path) -> Result<()> {
    tracing::debug!("Removing {}", path.display());
    fs::remove_file(path).map_err(|source| Error::Cleanup {
        path: path.to_path_buf(),
        source,
    })
}
