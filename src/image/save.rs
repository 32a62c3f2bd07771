//! Image saving utilities.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::DynamicImage;

use crate::error::{Error, Result};

/// Encoding used for the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG. Quality selects the compression effort.
    #[default]
    Png,
    /// Lossy JPEG. Quality is the encoder quality; alpha is dropped.
    Jpeg,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("png"),
            Self::Jpeg => f.write_str("jpeg"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(Error::InvalidParameter {
                name: "format".to_string(),
                reason: format!("unsupported output format {other:?}, expected png or jpeg"),
            }),
        }
    }
}

/// Save an image to `path`, overwriting any existing file.
///
/// `quality` (1-100) is handed to the encoder: for JPEG it is the encoder
/// quality, for PNG it picks the compression level.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the image cannot be
/// encoded.
pub fn save_image<P: AsRef<Path>>(
    img: &DynamicImage,
    path: P,
    format: OutputFormat,
    quality: u8,
) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(fs::File::create(path)?);

    let encoded = match format {
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut writer, png_compression(quality), PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            if img.color().has_alpha() {
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
            } else {
                img.write_with_encoder(encoder)
            }
        }
    };

    encoded.map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })?;

    writer.flush()?;

    Ok(())
}

fn png_compression(quality: u8) -> CompressionType {
    match quality {
        90.. => CompressionType::Best,
        50..=89 => CompressionType::Default,
        _ => CompressionType::Fast,
    }
}
