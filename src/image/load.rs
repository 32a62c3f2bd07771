//! Image loading utilities.

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use crate::error::{Error, Result};

/// Load an image from disk.
///
/// The format is guessed from the file contents, so a downloaded file with a
/// misleading extension still decodes.
///
/// Returns the decoded image together with its `(width, height)`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a supported image,
/// or has a zero dimension.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<(DynamicImage, (u32, u32))> {
    let path = path.as_ref();

    let open_err = |source| Error::ImageOpen {
        path: path.to_path_buf(),
        source,
    };

    let img = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(open_err)?
        .decode()
        .map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::UnsupportedDimensions {
            width,
            height,
            reason: "image has no pixels".to_string(),
        });
    }

    tracing::debug!("Decoded {} as {width}x{height} {:?}", path.display(), img.color());

    Ok((img, (width, height)))
}
