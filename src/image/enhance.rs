//! Upscaling and sharpness enhancement.

use image::{
    imageops::{self, FilterType},
    ColorType, DynamicImage, GenericImageView, ImageBuffer, Pixel, Rgba32FImage,
};

use crate::error::{Error, Result};

/// 3x3 smoothing kernel used to build the blurred reference image.
const SMOOTH_KERNEL: [u32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
const SMOOTH_SCALE: f32 = 13.0;

/// Compute the dimensions of an image scaled by an integer factor.
///
/// # Errors
///
/// Returns an error if either scaled dimension overflows `u32`.
pub fn scaled_dimensions(width: u32, height: u32, factor: u32) -> Result<(u32, u32)> {
    match (width.checked_mul(factor), height.checked_mul(factor)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(Error::UnsupportedDimensions {
            width,
            height,
            reason: format!("scaling by {factor} overflows"),
        }),
    }
}

/// Upscale an image by `factor` in both directions using Lanczos resampling.
///
/// The result is exactly `factor` times the input width and height. Images
/// with an alpha channel are resampled with premultiplied colour, so fully
/// transparent pixels do not bleed their colour into visible edges.
///
/// # Errors
///
/// Returns an error if the target dimensions overflow.
pub fn upscale(img: &DynamicImage, factor: u32) -> Result<DynamicImage> {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, factor)?;

    tracing::debug!("Resizing {width}x{height} -> {new_width}x{new_height} (Lanczos3)");

    if img.color().has_alpha() {
        Ok(resize_premultiplied(img, new_width, new_height))
    } else {
        Ok(img.resize_exact(new_width, new_height, FilterType::Lanczos3))
    }
}

fn resize_premultiplied(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let mut buf = img.to_rgba32f();
    for px in buf.pixels_mut() {
        let alpha = px[3];
        for c in &mut px.0[..3] {
            *c *= alpha;
        }
    }

    let mut resized = imageops::resize(&buf, width, height, FilterType::Lanczos3);
    unpremultiply(&mut resized);

    let resized = DynamicImage::ImageRgba32F(resized);
    match img.color() {
        ColorType::La8 => DynamicImage::ImageLumaA8(resized.to_luma_alpha8()),
        ColorType::La16 => DynamicImage::ImageLumaA16(resized.to_luma_alpha16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(resized.to_rgba16()),
        ColorType::Rgba32F => resized,
        _ => DynamicImage::ImageRgba8(resized.to_rgba8()),
    }
}

fn unpremultiply(buf: &mut Rgba32FImage) {
    for px in buf.pixels_mut() {
        let alpha = px[3].clamp(0.0, 1.0);
        px[3] = alpha;
        for c in &mut px.0[..3] {
            *c = if alpha > 0.0 {
                (*c / alpha).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }
}

/// Adjust the sharpness of an image.
///
/// The image is blended with a smoothed copy of itself:
/// `smooth + factor * (image - smooth)`. A factor of 1.0 returns the image
/// unchanged, 0.0 returns the smoothed copy, and values above 1.0 sharpen.
///
/// The alpha channel, if any, is passed through untouched.
///
/// 8-bit images keep their colour type. Wider images are reduced to the
/// 8-bit type with the same channels.
#[must_use]
pub fn sharpen(img: &DynamicImage, factor: f32) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(sharpen_buffer(buf, factor)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(sharpen_buffer(buf, factor)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(sharpen_buffer(buf, factor)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(sharpen_buffer(buf, factor)),
        other => match other.color() {
            ColorType::L16 => DynamicImage::ImageLuma8(sharpen_buffer(&other.to_luma8(), factor)),
            ColorType::La16 => {
                DynamicImage::ImageLumaA8(sharpen_buffer(&other.to_luma_alpha8(), factor))
            }
            color if color.has_alpha() => {
                DynamicImage::ImageRgba8(sharpen_buffer(&other.to_rgba8(), factor))
            }
            _ => DynamicImage::ImageRgb8(sharpen_buffer(&other.to_rgb8(), factor)),
        },
    }
}

fn sharpen_buffer<P>(src: &ImageBuffer<P, Vec<u8>>, factor: f32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let smoothed = smooth(src);
    let mut out = src.clone();

    let channels = usize::from(P::CHANNEL_COUNT);
    // Alpha is always the last channel.
    let alpha_index = P::HAS_ALPHA.then_some(channels - 1);

    let dst: &mut [u8] = &mut out;
    for (i, (value, (&orig, &soft))) in dst
        .iter_mut()
        .zip(src.as_raw().iter().zip(&smoothed))
        .enumerate()
    {
        if Some(i % channels) != alpha_index {
            *value = blend(soft, orig, factor);
        }
    }

    out
}

/// Apply `SMOOTH_KERNEL` to every channel. The outermost row and column on
/// each side are copied through unfiltered.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn smooth<P>(src: &ImageBuffer<P, Vec<u8>>) -> Vec<u8>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = src.dimensions();
    let (width, height) = (width as usize, height as usize);
    let channels = usize::from(P::CHANNEL_COUNT);
    let raw = src.as_raw();
    let mut out = raw.clone();

    if width < 3 || height < 3 {
        return out;
    }

    let stride = width * channels;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            for c in 0..channels {
                let mut sum = 0u32;
                for (k, weight) in SMOOTH_KERNEL.iter().enumerate() {
                    let (ky, kx) = (y + k / 3 - 1, x + k % 3 - 1);
                    sum += weight * u32::from(raw[ky * stride + kx * channels + c]);
                }
                // Safe: a weighted average of u8 values stays within [0, 255]
                out[y * stride + x * channels + c] = (sum as f32 / SMOOTH_SCALE + 0.5) as u8;
            }
        }
    }

    out
}

/// Interpolate from `soft` towards `orig` by `factor`, clamped to `u8`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(soft: u8, orig: u8, factor: f32) -> u8 {
    let soft = f32::from(soft);
    let value = factor.mul_add(f32::from(orig) - soft, soft);
    if value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        value as u8
    }
}
