//! Cropping and re-encoding.

use super::ContentBounds;
use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, GenericImageView};

/// Quality used when re-encoding cropped JPEGs.
pub const JPEG_QUALITY: u8 = 90;

/// Copy the `bounds` rectangle of `image` into a new buffer.
///
/// Degenerate bounds (zero or negative area) return the original image
/// unchanged. Bounds reaching past the image are clamped to it.
pub fn normalize(image: &DynamicImage, bounds: ContentBounds) -> DynamicImage {
    let (width, height) = image.dimensions();
    let clamped = ContentBounds {
        left: bounds.left.min(width),
        top: bounds.top.min(height),
        right: bounds.right.min(width),
        bottom: bounds.bottom.min(height),
    };

    if clamped.is_degenerate() {
        return image.clone();
    }

    image.crop_imm(
        clamped.left,
        clamped.top,
        clamped.width(),
        clamped.height(),
    )
}

/// Encode an image in `format`'s re-encode target.
///
/// JPEG output drops alpha; grayscale sources stay single-channel.
pub fn encode(image: &DynamicImage, format: SourceFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format.encode_target() {
        SourceFormat::Jpeg => {
            let flattened = match image.color() {
                ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                    DynamicImage::ImageLuma8(image.to_luma8())
                }
                _ => DynamicImage::ImageRgb8(image.to_rgb8()),
            };
            flattened
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
                .map_err(|e| Error::ImageEncode(e.to_string()))?;
        }
        _ => {
            let lossless = match image.color() {
                ColorType::Rgb32F | ColorType::Rgba32F => {
                    DynamicImage::ImageRgba16(image.to_rgba16())
                }
                _ => image.clone(),
            };
            lossless
                .write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(|e| Error::ImageEncode(e.to_string()))?;
        }
    }
    Ok(buf)
}
