//! # gigsheets
//!
//! Print-ready song sheets for gigs.
//!
//! A gig file lists sets of song references. Each reference resolves to a
//! sheet image from the song library configuration; the image is cropped
//! to its content, scaled to the page and placed top to bottom on A4 pages
//! with a footer. Unresolvable songs show up as red error lines instead of
//! silently disappearing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gigsheets::{generate_all, GenerateOptions};
//!
//! fn main() -> gigsheets::Result<()> {
//!     let options = GenerateOptions::new("config.yaml").with_all_songs(true);
//!     let report = generate_all(&options, &mut |_| {})?;
//!     for outcome in &report.outcomes {
//!         println!("{} ({} pages)", outcome.output.display(), outcome.pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`raster`]: whitespace detection, cropping and re-encoding
//! - [`layout`]: greedy pagination into a [`PagePlan`]
//! - [`render`]: plan emission to PDF, or JSON for inspection
//! - [`generate`]: configuration, gig resolution and batch runs

pub mod config;
pub mod detect;
pub mod error;
pub mod generate;
pub mod layout;
pub mod model;
pub mod raster;
pub mod render;

// Re-export commonly used types
pub use config::{Config, Gig, GigSet, Song, SongRef};
pub use detect::SourceFormat;
pub use error::{Error, Result};
pub use generate::{
    generate_all, generate_gig, generate_gig_file, BatchEvent, BatchReport, GenerateOptions,
    GenerationContext, GigFailure, GigOutcome,
};
pub use layout::{plan, LayoutConstants, PageOp, PagePlan, Rect};
pub use model::{Document, Entry, ErrorEntry, ImageEntry, SetEntries};
pub use raster::{ContentBounds, CropDecision, PreparedImage};
pub use render::JsonFormat;

use std::path::Path;

/// Generate every gig of a configuration with default options.
///
/// # Example
///
/// ```no_run
/// let report = gigsheets::generate("config.yaml").unwrap();
/// assert!(report.is_success());
/// ```
pub fn generate<P: AsRef<Path>>(config_path: P) -> Result<BatchReport> {
    let options = GenerateOptions::new(config_path.as_ref());
    generate_all(&options, &mut |_| {})
}

/// Plan every gig without writing PDFs and return the plans as JSON.
///
/// # Example
///
/// ```no_run
/// use gigsheets::{plan_json, GenerateOptions, JsonFormat};
///
/// let options = GenerateOptions::new("config.yaml");
/// println!("{}", plan_json(&options, JsonFormat::Pretty)?);
/// # Ok::<(), gigsheets::Error>(())
/// ```
pub fn plan_json(options: &GenerateOptions, format: JsonFormat) -> Result<String> {
    let options = options.clone().with_dry_run(true);
    let report = generate_all(&options, &mut |_| {})?;
    render::to_json_value(&report.plans(), format)
}

/// Crop the whitespace around an image file.
///
/// # Example
///
/// ```no_run
/// let image = gigsheets::crop_file("songs/ballad.png").unwrap();
/// std::fs::write("ballad-cropped.png", &image.data).unwrap();
/// ```
pub fn crop_file<P: AsRef<Path>>(path: P) -> Result<PreparedImage> {
    let path = path.as_ref();
    raster::prepare(path, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_missing_config() {
        let result = generate("/no/such/dir/config.yaml");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_crop_file_missing() {
        let result = crop_file("/no/such/dir/song.png");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_plan_json_formats() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("images")).unwrap();
        std::fs::create_dir(root.join("gigs")).unwrap();
        std::fs::write(
            root.join("config.yaml"),
            "imageFolder: images\ngigsFolder: gigs\noutputFolder: output\n\
             songs:\n  - nickname: ballad\n    image: ballad.png\n",
        )
        .unwrap();
        std::fs::write(
            root.join("gigs/friday.yaml"),
            "name: Friday\nsets:\n  - name: One\n    songs: [ghost]\n",
        )
        .unwrap();

        let options = GenerateOptions::new(root.join("config.yaml"));
        let compact = plan_json(&options, JsonFormat::Compact).unwrap();
        let pretty = plan_json(&options, JsonFormat::Pretty).unwrap();

        assert!(compact.starts_with('['));
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"document\":\"Friday\""));
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&compact).unwrap(),
            serde_json::from_str::<serde_json::Value>(&pretty).unwrap()
        );
        // Planning alone never writes output
        assert!(!root.join("output").exists());
    }
}
