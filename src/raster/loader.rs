//! Image decoding.

use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use image::DynamicImage;
use std::fs;
use std::path::Path;

/// Decode image bytes using the decoder for `format`.
///
/// [`SourceFormat::Other`] lets the decoder guess from the content.
pub fn decode(data: &[u8], format: SourceFormat) -> Result<DynamicImage> {
    let decoded = match format.image_format() {
        Some(fmt) => image::load_from_memory_with_format(data, fmt),
        None => image::load_from_memory(data),
    };
    decoded.map_err(|e| Error::ImageDecode(e.to_string()))
}

/// Read and decode an image file, choosing the decoder by extension.
///
/// Returns the raw file bytes alongside the decoded raster so callers can
/// embed the original when no crop is needed.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, DynamicImage, SourceFormat)> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    let format = SourceFormat::from_path(path);
    let image = decode(&data, format)?;
    Ok((data, image, format))
}
