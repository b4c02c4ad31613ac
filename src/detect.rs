//! Source image format detection.
//!
//! The decode path is chosen from the file extension first (PNG, JPEG), and
//! falls back to sniffing magic bytes for everything else.

use crate::error::{Error, Result};
use std::path::Path;

/// Compressed format of a song image on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Portable Network Graphics (lossless)
    Png,
    /// JPEG (lossy)
    Jpeg,
    /// Anything else the decoder can sniff (GIF, BMP, ...)
    Other,
}

impl SourceFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => SourceFormat::Png,
            Some("jpg") | Some("jpeg") => SourceFormat::Jpeg,
            _ => SourceFormat::Other,
        }
    }

    /// Infer the format from leading magic bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(PNG_MAGIC) {
            Some(SourceFormat::Png)
        } else if data.starts_with(JPEG_MAGIC) {
            Some(SourceFormat::Jpeg)
        } else if data.starts_with(b"GIF87a")
            || data.starts_with(b"GIF89a")
            || data.starts_with(b"BM")
        {
            Some(SourceFormat::Other)
        } else {
            None
        }
    }

    /// The format cropped images are re-encoded in.
    ///
    /// PNG and JPEG round-trip; everything else becomes PNG.
    pub fn encode_target(self) -> Self {
        match self {
            SourceFormat::Jpeg => SourceFormat::Jpeg,
            SourceFormat::Png | SourceFormat::Other => SourceFormat::Png,
        }
    }

    /// Decoder format for this source, if it is fixed.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            SourceFormat::Png => Some(image::ImageFormat::Png),
            SourceFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            SourceFormat::Other => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Png => write!(f, "PNG"),
            SourceFormat::Jpeg => write!(f, "JPEG"),
            SourceFormat::Other => write!(f, "other"),
        }
    }
}

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// File extensions picked up when scanning the image folder.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Check whether a path has one of the [`SUPPORTED_EXTENSIONS`].
pub fn has_supported_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Number of color components declared by a baseline or progressive JPEG.
///
/// Walks the marker segments up to the first start-of-frame marker.
pub fn jpeg_component_count(data: &[u8]) -> Result<u8> {
    if !data.starts_with(JPEG_MAGIC) {
        return Err(Error::UnsupportedImage("not a JPEG stream".to_string()));
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill bytes
            0xFF => pos += 1,
            // Standalone markers without a length
            0x01 | 0xD0..=0xD7 => pos += 2,
            // SOF0..SOF15 except DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return data
                    .get(pos + 9)
                    .copied()
                    .ok_or_else(|| Error::ImageDecode("truncated JPEG frame header".to_string()));
            }
            // Start of scan before any frame header
            0xDA => break,
            _ => {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + len;
            }
        }
    }

    Err(Error::ImageDecode("JPEG frame header not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path("a/b/song.png"), SourceFormat::Png);
        assert_eq!(SourceFormat::from_path("song.JPG"), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path("song.jpeg"), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path("song.gif"), SourceFormat::Other);
        assert_eq!(SourceFormat::from_path("song"), SourceFormat::Other);
    }

    #[test]
    fn test_format_from_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(SourceFormat::from_bytes(&png), Some(SourceFormat::Png));
        assert_eq!(
            SourceFormat::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(SourceFormat::Jpeg)
        );
        assert_eq!(SourceFormat::from_bytes(b"GIF89a.."), Some(SourceFormat::Other));
        assert_eq!(SourceFormat::from_bytes(b"<html>"), None);
    }

    #[test]
    fn test_encode_target() {
        assert_eq!(SourceFormat::Png.encode_target(), SourceFormat::Png);
        assert_eq!(SourceFormat::Jpeg.encode_target(), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::Other.encode_target(), SourceFormat::Png);
    }

    #[test]
    fn test_supported_extension() {
        assert!(has_supported_extension("x.png"));
        assert!(has_supported_extension("x.JPEG"));
        assert!(!has_supported_extension("x.gif"));
        assert!(!has_supported_extension("README"));
    }

    #[test]
    fn test_jpeg_component_count() {
        // SOI, APP0 (length 4), SOF0 with 3 components
        let data = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x10, 0x00, 0x10, 0x03, 0x01, 0x22, 0x00,
        ];
        assert_eq!(jpeg_component_count(&data).unwrap(), 3);
    }

    #[test]
    fn test_jpeg_component_count_rejects_png() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(matches!(
            jpeg_component_count(&png),
            Err(Error::UnsupportedImage(_))
        ));
    }
}
