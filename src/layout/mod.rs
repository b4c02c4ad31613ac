//! Page layout: geometry, constants and the placement planner.

mod constants;
mod geometry;
pub mod planner;

pub use constants::{
    resolve_spacing, LayoutConstants, A4_HEIGHT, A4_WIDTH, DEFAULT_PIXEL_SIZE, DEFAULT_SPACING,
    ERROR_BLOCK_HEIGHT, MM_PER_POINT,
};
pub use geometry::{Rect, Size};
pub use planner::{plan, PageCursor, PageOp, PagePlan, PageState};
