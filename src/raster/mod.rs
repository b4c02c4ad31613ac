//! Raster processing: whitespace detection, cropping and re-encoding.
//!
//! [`prepare`] is the per-image pipeline used during generation:
//! decode, detect content bounds, crop, and re-encode in an embeddable form.

pub mod bounds;
pub mod loader;
pub mod normalize;

pub use bounds::{content_bounds, detect, is_background, ContentBounds, CropDecision};
pub use loader::{decode, load};
pub use normalize::{encode, normalize};

use crate::detect::SourceFormat;
use crate::error::Result;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// An image ready to be embedded in the output document.
///
/// `data` is always PNG or JPEG, as recorded in `format`.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Encoded bytes
    pub data: Vec<u8>,

    /// Encoding of `data` (PNG or JPEG)
    pub format: SourceFormat,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Whether whitespace was removed
    pub cropped: bool,
}

impl PreparedImage {
    /// Pixel dimensions as a (width, height) tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Load an image file and crop its surrounding whitespace.
///
/// `label` names the image in debug output (usually the song reference).
pub fn prepare<P: AsRef<Path>>(path: P, label: &str) -> Result<PreparedImage> {
    let (data, image, format) = load(path.as_ref())?;
    prepare_decoded(data, &image, format, label)
}

/// Crop and encode an already decoded image.
///
/// If re-encoding the crop fails, the uncropped original is used.
pub fn prepare_decoded(
    data: Vec<u8>,
    image: &DynamicImage,
    format: SourceFormat,
    label: &str,
) -> Result<PreparedImage> {
    let (width, height) = image.dimensions();

    let bounds = match detect(image) {
        CropDecision::NoCropNeeded => {
            log::debug!(
                "Image '{}' - no cropping needed: {}x{}",
                label,
                width,
                height
            );
            return uncropped(data, image, format);
        }
        CropDecision::Crop(bounds) if bounds.is_degenerate() => {
            log::debug!("Image '{}' - invalid crop dimensions, using original", label);
            return uncropped(data, image, format);
        }
        CropDecision::Crop(bounds) => bounds,
    };

    log::debug!(
        "Image '{}' - cropping: original={}x{}, cropped={}x{}, removed: left={}, top={}, right={}, bottom={}",
        label,
        width,
        height,
        bounds.width(),
        bounds.height(),
        bounds.left,
        bounds.top,
        width - bounds.right,
        height - bounds.bottom
    );

    let cropped = normalize(image, bounds);
    let target = format.encode_target();
    match encode(&cropped, target) {
        Ok(encoded) => Ok(PreparedImage {
            data: encoded,
            format: target,
            width: cropped.width(),
            height: cropped.height(),
            cropped: true,
        }),
        Err(e) => {
            log::warn!(
                "Could not encode cropped image '{}': {}; using original",
                label,
                e
            );
            uncropped(data, image, format)
        }
    }
}

fn uncropped(data: Vec<u8>, image: &DynamicImage, format: SourceFormat) -> Result<PreparedImage> {
    let (width, height) = image.dimensions();
    let (data, format) = match format {
        SourceFormat::Png | SourceFormat::Jpeg => (data, format),
        SourceFormat::Other => (encode(image, SourceFormat::Png)?, SourceFormat::Png),
    };
    Ok(PreparedImage {
        data,
        format,
        width,
        height,
        cropped: false,
    })
}
