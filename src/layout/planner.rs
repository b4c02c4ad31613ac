//! Greedy single-pass pagination.
//!
//! Entries are placed top to bottom in document order. A block moves to a new
//! page when the space left above the footer band is strictly less than its
//! height plus the spacing; a block that fits exactly stays. The check does
//! not look at whether the page is empty, so a block taller than the content
//! area leaves a blank page behind and overflows the next one. Every set
//! after the first starts on a fresh page unless the current page is still
//! empty.

use super::constants::LayoutConstants;
use super::geometry::Rect;
use crate::model::{Document, Entry};
use serde::{Deserialize, Serialize};

/// One directive of a layout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageOp {
    /// Open a new page
    StartPage,

    /// Write the footer of the page just opened
    Footer { page: u32 },

    /// Draw a prepared image
    PlaceImage { source: String, rect: Rect },

    /// Draw an error placeholder
    PlaceError { message: String, rect: Rect },
}

/// Whether anything has been placed on the current page yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    OnEmptyPage,
    OnPartialPage,
}

/// Position of the next block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    /// Current page number (1-based, 0 before the first page)
    pub page: u32,

    /// Top of the next block, from the top edge of the page
    pub y: f64,
}

impl PageCursor {
    fn new() -> Self {
        Self { page: 0, y: 0.0 }
    }

    /// Space left between the cursor and the bottom of the content area.
    pub fn remaining(&self, layout: &LayoutConstants) -> f64 {
        layout.content_bottom() - self.y
    }

    pub fn state(&self, layout: &LayoutConstants) -> PageState {
        if self.y > layout.margin {
            PageState::OnPartialPage
        } else {
            PageState::OnEmptyPage
        }
    }
}

/// The ordered directives for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Document name, used for footer text
    pub document: String,

    /// Directives in emission order
    pub ops: Vec<PageOp>,
}

impl PagePlan {
    /// Number of pages the plan opens.
    pub fn page_count(&self) -> u32 {
        self.ops
            .iter()
            .filter(|op| matches!(op, PageOp::StartPage))
            .count() as u32
    }

    /// Number of images and error placeholders placed.
    pub fn placement_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, PageOp::PlaceImage { .. } | PageOp::PlaceError { .. }))
            .count()
    }

    /// Footer text for a page.
    pub fn footer_text(&self, page: u32) -> String {
        format!("{} - Page {}", self.document, page)
    }
}

struct Planner<'a> {
    layout: &'a LayoutConstants,
    cursor: PageCursor,
    ops: Vec<PageOp>,
}

impl<'a> Planner<'a> {
    fn new(layout: &'a LayoutConstants) -> Self {
        let mut planner = Self {
            layout,
            cursor: PageCursor::new(),
            ops: Vec::new(),
        };
        planner.start_page();
        planner
    }

    fn start_page(&mut self) {
        self.cursor.page += 1;
        self.cursor.y = self.layout.margin;
        self.ops.push(PageOp::StartPage);
        self.ops.push(PageOp::Footer {
            page: self.cursor.page,
        });
    }

    fn begin_set(&mut self) {
        if self.cursor.state(self.layout) == PageState::OnPartialPage {
            self.start_page();
        }
    }

    /// Claim vertical space for a block and return its top edge.
    fn reserve(&mut self, height: f64) -> f64 {
        let needed = height + self.layout.spacing;
        if self.cursor.remaining(self.layout) < needed {
            self.start_page();
            if self.cursor.remaining(self.layout) < needed {
                log::warn!(
                    "Block of height {:.2}mm does not fit on a page (page {})",
                    height,
                    self.cursor.page
                );
            }
        }
        let top = self.cursor.y;
        self.cursor.y += needed;
        top
    }

    fn place(&mut self, entry: &Entry) {
        let margin = self.layout.margin;
        match entry {
            Entry::Image(image) => {
                let size = self.layout.display_size(image.width_px, image.height_px);
                log::debug!(
                    "Image '{}' - {}x{}px displayed at {:.2}mm x {:.2}mm",
                    image.source,
                    image.width_px,
                    image.height_px,
                    size.width,
                    size.height
                );
                let y = self.reserve(size.height);
                self.ops.push(PageOp::PlaceImage {
                    source: image.source.clone(),
                    rect: Rect::from_origin(margin, y, size),
                });
            }
            Entry::Error(error) => {
                let height = self.layout.error_height;
                let y = self.reserve(height);
                self.ops.push(PageOp::PlaceError {
                    message: error.message.clone(),
                    rect: Rect::new(margin, y, self.layout.content_width(), height),
                });
            }
        }
    }

    fn finish(self, document: &Document) -> PagePlan {
        PagePlan {
            document: document.name.clone(),
            ops: self.ops,
        }
    }
}

/// Lay out a document.
///
/// The plan always opens at least one page, even for an empty document.
pub fn plan(document: &Document, layout: &LayoutConstants) -> PagePlan {
    let mut planner = Planner::new(layout);

    for (index, set) in document.sets.iter().enumerate() {
        if index > 0 {
            planner.begin_set();
        }
        for entry in &set.entries {
            planner.place(entry);
        }
    }

    planner.finish(document)
}
