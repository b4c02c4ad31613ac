//! Plan emission.
//!
//! The emitter walks a [`PagePlan`] and forwards each directive to a
//! [`PageSink`]. All positions come from the plan; the emitter only chooses
//! text content and styling.

use crate::error::Result;
use crate::layout::{LayoutConstants, PageOp, PagePlan, Rect};
use crate::raster::PreparedImage;
use std::collections::HashMap;

/// Height of the footer text cell.
pub const FOOTER_CELL_HEIGHT: f64 = 5.0;

/// Prepared images keyed by [`crate::model::ImageEntry::source`].
pub type ImageAssets = HashMap<String, PreparedImage>;

/// Font and color for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f32,

    /// Bold face
    pub bold: bool,

    /// RGB color, 0-255 per channel
    pub color: [u8; 3],
}

impl TextStyle {
    /// Page footer: 8pt regular, black.
    pub const FOOTER: TextStyle = TextStyle {
        size: 8.0,
        bold: false,
        color: [0, 0, 0],
    };

    /// Error placeholder: 12pt bold, red.
    pub const ERROR: TextStyle = TextStyle {
        size: 12.0,
        bold: true,
        color: [255, 0, 0],
    };
}

/// Drawing backend for an emitted plan.
///
/// Rects are in millimetres from the top-left corner of the page.
pub trait PageSink {
    /// Open a new page of the given size.
    fn begin_page(&mut self, width: f64, height: f64) -> Result<()>;

    /// Draw an image scaled into `rect`.
    ///
    /// `key` identifies the image so repeated placements can share data.
    fn draw_image(&mut self, key: &str, image: &PreparedImage, rect: Rect) -> Result<()>;

    /// Draw a single line of text, vertically centered in `rect`.
    fn draw_text(&mut self, text: &str, rect: Rect, style: TextStyle) -> Result<()>;
}

/// Forward every directive of `plan` to `sink`.
pub fn emit<S: PageSink + ?Sized>(
    plan: &PagePlan,
    layout: &LayoutConstants,
    assets: &ImageAssets,
    sink: &mut S,
) -> Result<()> {
    for op in &plan.ops {
        match op {
            PageOp::StartPage => sink.begin_page(layout.page_width, layout.page_height)?,
            PageOp::Footer { page } => {
                let rect = Rect::new(
                    layout.margin,
                    layout.footer_top(),
                    layout.content_width(),
                    FOOTER_CELL_HEIGHT,
                );
                sink.draw_text(&plan.footer_text(*page), rect, TextStyle::FOOTER)?;
            }
            PageOp::PlaceImage { source, rect } => match assets.get(source) {
                Some(image) => sink.draw_image(source, image, *rect)?,
                None => {
                    log::warn!("Image '{}' missing from asset store", source);
                    let text = format!("ERROR: Image not available: {}", source);
                    sink.draw_text(&text, *rect, TextStyle::ERROR)?;
                }
            },
            PageOp::PlaceError { message, rect } => {
                sink.draw_text(&format!("ERROR: {}", message), *rect, TextStyle::ERROR)?;
            }
        }
    }
    Ok(())
}
