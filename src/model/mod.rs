//! Document model types.
//!
//! A [`Document`] is the intermediate representation between the YAML gig
//! description and the layout planner: every song reference has already been
//! resolved to either an image entry or an error entry.

mod document;

pub use document::{Document, Entry, ErrorEntry, ImageEntry, SetEntries};
