//! Page geometry and spacing for one generation pass.

use super::geometry::Size;
use serde::{Deserialize, Serialize};

/// Spacing between placed blocks when neither the run nor the config sets one.
pub const DEFAULT_SPACING: f64 = 5.0;

/// Height reserved for an error placeholder.
pub const ERROR_BLOCK_HEIGHT: f64 = 10.0;

/// Millimetres per PDF point.
pub const MM_PER_POINT: f64 = 0.352778;

/// Physical size of one source pixel in millimetres (roughly 204 DPI).
///
/// Applies to every image; DPI metadata in the file is not consulted.
pub const DEFAULT_PIXEL_SIZE: f64 = MM_PER_POINT * MM_PER_POINT;

/// A4 portrait, in millimetres.
pub const A4_WIDTH: f64 = 210.0;
pub const A4_HEIGHT: f64 = 297.0;

/// Resolve the spacing by precedence: explicit override, configured value,
/// then [`DEFAULT_SPACING`].
///
/// Negative overrides are treated as unset.
pub fn resolve_spacing(override_spacing: Option<f64>, configured: Option<f64>) -> f64 {
    override_spacing
        .filter(|s| *s >= 0.0)
        .or(configured)
        .unwrap_or(DEFAULT_SPACING)
}

/// Page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConstants {
    /// Page width
    pub page_width: f64,

    /// Page height
    pub page_height: f64,

    /// Margin on the left, right and top edges
    pub margin: f64,

    /// Band at the bottom of the page holding the footer
    pub footer_height: f64,

    /// Gap after each placed block
    pub spacing: f64,

    /// Height reserved for an error placeholder
    pub error_height: f64,

    /// Millimetres per source pixel
    pub pixel_size: f64,
}

impl LayoutConstants {
    /// A4 portrait with the default margins and spacing.
    pub fn a4() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 10.0,
            footer_height: 15.0,
            spacing: DEFAULT_SPACING,
            error_height: ERROR_BLOCK_HEIGHT,
            pixel_size: DEFAULT_PIXEL_SIZE,
        }
    }

    /// Create new layout constants with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inter-item spacing.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set the footer band height.
    pub fn with_footer_height(mut self, height: f64) -> Self {
        self.footer_height = height;
        self
    }

    /// Set the physical size of a source pixel.
    pub fn with_pixel_size(mut self, mm: f64) -> Self {
        self.pixel_size = mm;
        self
    }

    /// Width available to content between the side margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y a block may reach before the footer band.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.footer_height - self.margin
    }

    /// Top of the footer band, where the footer text starts.
    pub fn footer_top(&self) -> f64 {
        self.page_height - self.footer_height
    }

    /// Natural physical size of an image of the given pixel dimensions.
    pub fn natural_size(&self, width_px: u32, height_px: u32) -> Size {
        Size::new(
            f64::from(width_px) * self.pixel_size,
            f64::from(height_px) * self.pixel_size,
        )
    }

    /// Size an image is drawn at: natural size, shrunk to the content width
    /// when it is strictly wider.
    pub fn display_size(&self, width_px: u32, height_px: u32) -> Size {
        self.natural_size(width_px, height_px)
            .fit_width(self.content_width())
    }
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_spacing_precedence() {
        assert_eq!(resolve_spacing(Some(2.0), Some(8.0)), 2.0);
        assert_eq!(resolve_spacing(None, Some(8.0)), 8.0);
        assert_eq!(resolve_spacing(None, None), DEFAULT_SPACING);
        assert_eq!(resolve_spacing(Some(0.0), Some(8.0)), 0.0);
        assert_eq!(resolve_spacing(Some(-1.0), Some(8.0)), 8.0);
    }

    #[test]
    fn test_a4_geometry() {
        let layout = LayoutConstants::a4();
        assert_eq!(layout.content_width(), 190.0);
        assert_eq!(layout.content_bottom(), 272.0);
        assert_eq!(layout.footer_top(), 282.0);
    }

    #[test]
    fn test_display_size_scales_wide_images() {
        let layout = LayoutConstants::a4().with_pixel_size(1.0);
        let size = layout.display_size(300, 100);
        assert_eq!(size.width, 190.0);
        assert!((size.height - 63.33).abs() < 0.01);

        let small = layout.display_size(100, 50);
        assert_eq!(small, Size::new(100.0, 50.0));
    }

    #[test]
    fn test_builder() {
        let layout = LayoutConstants::new()
            .with_spacing(2.5)
            .with_margin(15.0)
            .with_page_size(100.0, 200.0)
            .with_footer_height(20.0);
        assert_eq!(layout.spacing, 2.5);
        assert_eq!(layout.content_width(), 70.0);
        assert_eq!(layout.content_bottom(), 165.0);
    }
}
