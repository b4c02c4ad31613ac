//! Content bounding-box detection.
//!
//! A pixel is background when it is fully transparent or when its red, green
//! and blue channels are all at or above [`BACKGROUND_THRESHOLD`]. Alpha is
//! not composited; the raw channel values are compared.
//!
//! Each side is found by its own directional scan. The scans are independent
//! min/max reductions, so two disjoint islands arranged diagonally produce
//! the box spanning both rather than failing.

use image::{GenericImageView, Rgba};
use serde::{Deserialize, Serialize};

/// Channel value at or above which a pixel counts as near-white.
pub const BACKGROUND_THRESHOLD: u8 = 240;

/// Rectangle bounding the non-background content of an image.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    /// Bounds covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    /// Width of the bounded region, or zero when degenerate.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the bounded region, or zero when degenerate.
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether the region has no area.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Whether the bounds reach every edge of a `width` x `height` image.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right >= width && self.bottom >= height
    }
}

/// Outcome of [`detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropDecision {
    /// Content already touches every edge; the image can be used as is.
    NoCropNeeded,
    /// Content lies inside these bounds.
    Crop(ContentBounds),
}

/// Whether a pixel is transparent or near-white.
#[inline]
pub fn is_background(pixel: Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    a == 0 || (r >= BACKGROUND_THRESHOLD && g >= BACKGROUND_THRESHOLD && b >= BACKGROUND_THRESHOLD)
}

fn is_foreground<I>(image: &I, x: u32, y: u32) -> bool
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    !is_background(image.get_pixel(x, y))
}

/// First column, scanning left to right, that contains content.
pub fn left_bound<I>(image: &I) -> u32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    (0..width)
        .find(|&x| (0..height).any(|y| is_foreground(image, x, y)))
        .unwrap_or(0)
}

/// First row, scanning top to bottom, that contains content.
pub fn top_bound<I>(image: &I) -> u32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    (0..height)
        .find(|&y| (0..width).any(|x| is_foreground(image, x, y)))
        .unwrap_or(0)
}

/// One past the last row containing content, scanning bottom to top.
pub fn bottom_bound<I>(image: &I) -> u32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    (0..height)
        .rev()
        .find(|&y| (0..width).any(|x| is_foreground(image, x, y)))
        .map_or(height, |y| y + 1)
}

/// One past the last column containing content, scanning right to left.
pub fn right_bound<I>(image: &I) -> u32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    (0..width)
        .rev()
        .find(|&x| (0..height).any(|y| is_foreground(image, x, y)))
        .map_or(width, |x| x + 1)
}

/// Run the four directional scans.
pub fn content_bounds<I>(image: &I) -> ContentBounds
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    ContentBounds {
        left: left_bound(image),
        top: top_bound(image),
        right: right_bound(image),
        bottom: bottom_bound(image),
    }
}

/// Decide whether an image needs cropping.
pub fn detect<I>(image: &I) -> CropDecision
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let bounds = content_bounds(image);
    if bounds.covers(width, height) {
        CropDecision::NoCropNeeded
    } else {
        CropDecision::Crop(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn canvas(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, WHITE)
    }

    #[test]
    fn test_background_classification() {
        assert!(is_background(WHITE));
        assert!(is_background(Rgba([240, 240, 240, 255])));
        assert!(is_background(Rgba([0, 0, 0, 0])));
        assert!(!is_background(Rgba([239, 255, 255, 255])));
        assert!(!is_background(BLACK));
        // Alpha is not composited: a faint but non-zero alpha still counts
        assert!(!is_background(Rgba([0, 0, 0, 1])));
    }

    #[test]
    fn test_single_block() {
        let mut img = canvas(10, 8);
        for x in 2..5 {
            for y in 3..6 {
                img.put_pixel(x, y, BLACK);
            }
        }
        let bounds = content_bounds(&img);
        assert_eq!(
            bounds,
            ContentBounds {
                left: 2,
                top: 3,
                right: 5,
                bottom: 6
            }
        );
        assert_eq!(detect(&img), CropDecision::Crop(bounds));
    }

    #[test]
    fn test_all_white_needs_no_crop() {
        let img = canvas(6, 4);
        assert_eq!(content_bounds(&img), ContentBounds::full(6, 4));
        assert_eq!(detect(&img), CropDecision::NoCropNeeded);
    }

    #[test]
    fn test_fully_transparent_needs_no_crop() {
        let img = RgbaImage::from_pixel(5, 5, Rgba([12, 34, 56, 0]));
        assert_eq!(detect(&img), CropDecision::NoCropNeeded);
    }

    #[test]
    fn test_tight_image_is_idempotent() {
        let img = RgbaImage::from_pixel(4, 3, BLACK);
        assert_eq!(detect(&img), CropDecision::NoCropNeeded);
    }

    #[test]
    fn test_diagonal_islands_span_both() {
        let mut img = canvas(10, 10);
        img.put_pixel(8, 1, BLACK);
        img.put_pixel(1, 8, BLACK);
        let bounds = content_bounds(&img);
        assert_eq!(bounds.left, 1);
        assert_eq!(bounds.top, 1);
        assert_eq!(bounds.right, 9);
        assert_eq!(bounds.bottom, 9);
    }

    #[test]
    fn test_content_on_edges() {
        let mut img = canvas(5, 5);
        img.put_pixel(0, 2, BLACK);
        img.put_pixel(4, 2, BLACK);
        let bounds = content_bounds(&img);
        assert_eq!((bounds.left, bounds.right), (0, 5));
        assert_eq!((bounds.top, bounds.bottom), (2, 3));
        assert!(matches!(detect(&img), CropDecision::Crop(_)));
    }

    #[test]
    fn test_bounds_helpers() {
        let b = ContentBounds {
            left: 3,
            top: 2,
            right: 3,
            bottom: 7,
        };
        assert!(b.is_degenerate());
        assert_eq!(b.width(), 0);
        assert_eq!(b.height(), 5);
        assert!(ContentBounds::full(4, 4).covers(4, 4));
    }
}
