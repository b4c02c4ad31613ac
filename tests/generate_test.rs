//! End-to-end tests: configuration and gig files in, PDFs out.

use gigsheets::generate::{generate_all, BatchEvent, GenerateOptions};
use gigsheets::{plan_json, JsonFormat, PageOp};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG: &str = r#"
imageFolder: images
gigsFolder: gigs
outputFolder: output
songs:
  - nickname: ballad
    image: ballad.png
  - nickname: rocker
    images:
      default: rocker.png
      acoustic: rocker-acoustic.png
  - nickname: tall
    image: tall.png
"#;

/// A band folder with a config, three sheet images and the given gigs.
fn band(gigs: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("images")).unwrap();
    fs::create_dir(root.join("gigs")).unwrap();

    save_sheet(&root.join("images/ballad.png"), 400, 200);
    save_sheet(&root.join("images/rocker.png"), 400, 300);
    save_sheet(&root.join("images/rocker-acoustic.png"), 300, 300);
    // ~190mm of content: two of these never share a page
    save_sheet(&root.join("images/tall.png"), 1200, 1530);

    let config = root.join("config.yaml");
    fs::write(&config, CONFIG).unwrap();
    for (name, text) in gigs {
        fs::write(root.join("gigs").join(name), text).unwrap();
    }
    (dir, config)
}

/// White sheet with a dark frame 10px in from each edge.
fn save_sheet(path: &Path, width: u32, height: u32) {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for x in 10..width - 10 {
        img.put_pixel(x, 10, Rgba([0, 0, 0, 255]));
        img.put_pixel(x, height - 11, Rgba([0, 0, 0, 255]));
    }
    for y in 10..height - 10 {
        img.put_pixel(10, y, Rgba([0, 0, 0, 255]));
        img.put_pixel(width - 11, y, Rgba([0, 0, 0, 255]));
    }
    img.save(path).unwrap();
}

fn pdf_pages(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

fn run(options: &GenerateOptions) -> gigsheets::BatchReport {
    generate_all(options, &mut |_| {}).unwrap()
}

const FRIDAY: &str = r#"
name: Friday Night
sets:
  - name: First
    songs: [ballad, rocker]
  - name: Second
    songs: ["rocker#acoustic", ballad]
"#;

#[test]
fn test_generates_pdf_per_gig() {
    let (dir, config) = band(&[("friday.yaml", FRIDAY), ("saturday.yml", FRIDAY)]);
    let report = run(&GenerateOptions::new(&config));

    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 2);

    let friday = dir.path().join("output/friday.pdf");
    let saturday = dir.path().join("output/saturday.pdf");
    assert!(friday.is_file());
    assert!(saturday.is_file());

    // Two short sets: one page each
    assert_eq!(report.outcomes[0].pages, 2);
    assert_eq!(pdf_pages(&friday), 2);
    assert_eq!(report.outcomes[0].name, "Friday Night");
    assert_eq!(report.outcomes[0].errors, 0);
}

#[test]
fn test_unknown_variant_becomes_error_entry() {
    let gig = "name: Gig\nsets:\n  - name: One\n    songs: [\"ballad#acoustic\", rocker]\n";
    let (_dir, config) = band(&[("gig.yaml", gig)]);
    let report = run(&GenerateOptions::new(&config));

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.entries, 2);
    assert_eq!(outcome.errors, 1);

    let messages: Vec<_> = outcome
        .plan
        .ops
        .iter()
        .filter_map(|op| match op {
            PageOp::PlaceError { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(messages, vec!["No image 'acoustic' found for song 'ballad'"]);
    // Layout continued past the error
    assert!(matches!(outcome.plan.ops.last(), Some(PageOp::PlaceImage { .. })));
    assert!(outcome.output.is_file());
}

#[test]
fn test_broken_gig_does_not_stop_batch() {
    let (dir, config) = band(&[
        ("a-good.yaml", FRIDAY),
        ("b-broken.yaml", "name: [unclosed\n"),
        ("c-good.yaml", FRIDAY),
    ]);

    let mut events = Vec::new();
    let report = generate_all(&GenerateOptions::new(&config), &mut |event: BatchEvent<'_>| {
        events.push(match event {
            BatchEvent::Discovered { count, .. } => format!("found {}", count),
            BatchEvent::NoGigs { .. } => "none".to_string(),
            BatchEvent::Generated(o) => format!("ok {}", o.name),
            BatchEvent::Failed(f) => format!(
                "failed {}",
                f.source.file_name().unwrap().to_string_lossy()
            ),
        });
    })
    .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        events,
        vec![
            "found 3",
            "ok Friday Night",
            "failed b-broken.yaml",
            "ok Friday Night"
        ]
    );
    assert!(dir.path().join("output/c-good.pdf").is_file());
    assert!(!dir.path().join("output/b-broken.pdf").exists());
}

#[test]
fn test_tall_images_paginate() {
    let gig = "name: Tall\nsets:\n  - name: One\n    songs: [tall, tall, tall]\n";
    let (dir, config) = band(&[("tall.yaml", gig)]);
    let report = run(&GenerateOptions::new(&config));

    assert_eq!(report.outcomes[0].pages, 3);
    assert_eq!(pdf_pages(&dir.path().join("output/tall.pdf")), 3);
}

#[test]
fn test_spacing_override() {
    let (_dir, config) = band(&[("friday.yaml", FRIDAY)]);
    let report = run(&GenerateOptions::new(&config).with_spacing(Some(0.0)));

    let tops: Vec<f64> = report.outcomes[0]
        .plan
        .ops
        .iter()
        .filter_map(|op| match op {
            PageOp::PlaceImage { rect, .. } => Some(rect.y),
            _ => None,
        })
        .collect();
    // Second image starts right below the first (cropped to 380x180px)
    let first_height = 180.0 * gigsheets::layout::DEFAULT_PIXEL_SIZE;
    assert!((tops[1] - (10.0 + first_height)).abs() < 1e-9);
}

#[test]
fn test_all_songs_with_override() {
    let (dir, config) = band(&[]);
    let options = GenerateOptions::new(&config)
        .with_all_songs(true)
        .with_image_override("acoustic")
        .with_output("print");
    let report = run(&options);

    let output = dir.path().join("print/_all_acoustic.pdf");
    assert!(output.is_file());
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.name, "All Songs");
    assert_eq!(outcome.entries, 3);
    assert_eq!(outcome.errors, 0);

    let sources: Vec<_> = outcome
        .plan
        .ops
        .iter()
        .filter_map(|op| match op {
            PageOp::PlaceImage { source, .. } => Some(source.clone()),
            _ => None,
        })
        .collect();
    assert!(sources[1].ends_with("rocker-acoustic.png"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (dir, config) = band(&[("friday.yaml", FRIDAY)]);
    let options = GenerateOptions::new(&config);
    let json = plan_json(&options, JsonFormat::Compact).unwrap();

    assert!(json.starts_with('['));
    assert!(json.contains("\"document\":\"Friday Night\""));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_missing_image_file_is_visible() {
    let (dir, config) = band(&[("friday.yaml", FRIDAY)]);
    fs::remove_file(dir.path().join("images/ballad.png")).unwrap();

    let report = run(&GenerateOptions::new(&config));
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.errors, 2);
    assert!(outcome.output.is_file());

    let doc_errors = outcome
        .plan
        .ops
        .iter()
        .filter(|op| {
            matches!(op, PageOp::PlaceError { message, .. }
                if message.starts_with("Image file not found: "))
        })
        .count();
    assert_eq!(doc_errors, 2);
}

#[test]
fn test_missing_gigs_folder_still_writes_all_songs() {
    let (dir, config) = band(&[]);
    fs::remove_dir(dir.path().join("gigs")).unwrap();

    let mut no_gigs = false;
    let options = GenerateOptions::new(&config).with_all_songs(true);
    let report = generate_all(&options, &mut |event: BatchEvent<'_>| {
        no_gigs |= matches!(event, BatchEvent::NoGigs { .. });
    })
    .unwrap();

    assert!(no_gigs);
    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 1);
    assert!(dir.path().join("output/_all.pdf").is_file());
}
