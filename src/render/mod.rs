//! Rendering of layout plans to PDF and JSON.

mod emitter;
mod json;
mod metrics;
mod pdf;

pub use emitter::{emit, ImageAssets, PageSink, TextStyle, FOOTER_CELL_HEIGHT};
pub use json::{to_json, to_json_value, JsonFormat};
pub use pdf::PdfWriter;
