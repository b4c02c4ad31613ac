//! Page-space geometry, in millimetres with the origin at the top-left.

use serde::{Deserialize, Serialize};

/// Width and height of a block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or zero for a flat block.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }

    /// Shrink proportionally so the width does not exceed `max_width`.
    ///
    /// Blocks that already fit are returned unchanged; nothing is enlarged.
    pub fn fit_width(self, max_width: f64) -> Self {
        if self.width > max_width {
            let scale = max_width / self.width;
            Self {
                width: max_width,
                height: self.height * scale,
            }
        } else {
            self
        }
    }
}

/// A placed block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rect from its top-left corner and size.
    pub fn from_origin(x: f64, y: f64, size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    /// Bottom edge (y grows downwards).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_scales_down() {
        let fitted = Size::new(300.0, 100.0).fit_width(190.0);
        assert_eq!(fitted.width, 190.0);
        assert!((fitted.height - 63.333).abs() < 0.001);
    }

    #[test]
    fn test_fit_width_never_upscales() {
        let size = Size::new(120.0, 80.0);
        assert_eq!(size.fit_width(190.0), size);
        // Exactly the available width is left alone
        assert_eq!(Size::new(190.0, 5.0).fit_width(190.0), Size::new(190.0, 5.0));
    }

    #[test]
    fn test_rect_bottom() {
        let rect = Rect::from_origin(10.0, 20.0, Size::new(5.0, 7.5));
        assert_eq!(rect.bottom(), 27.5);
        assert_eq!(rect.size(), Size::new(5.0, 7.5));
    }
}
