//! Checking configured images against the image folder.

use super::{Config, Song, VariantMap, DEFAULT_VARIANT};
use crate::detect::has_supported_extension;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// One image reference of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCheck {
    pub song: String,

    /// `None` for a legacy single `image`
    pub variant: Option<String>,

    pub file: String,
}

impl fmt::Display for ImageCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(
                f,
                "Song '{}' variant '{}': {}",
                self.song, variant, self.file
            ),
            None => write!(f, "Song '{}': {}", self.song, self.file),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: Vec<ImageCheck>,
    pub missing: Vec<ImageCheck>,
}

impl ValidationReport {
    /// True when every referenced image exists.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check that every image referenced by the configuration exists.
pub fn validate(config: &Config, image_dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    for song in &config.songs {
        let single = song
            .image
            .iter()
            .filter(|i| !i.is_empty())
            .map(|file| (None, file));
        let variants = song
            .images
            .iter()
            .flatten()
            .map(|(variant, file)| (Some(variant.clone()), file));

        for (variant, file) in single.chain(variants) {
            let check = ImageCheck {
                song: song.nickname.clone(),
                variant,
                file: file.clone(),
            };
            if image_dir.join(file).exists() {
                report.valid.push(check);
            } else {
                report.missing.push(check);
            }
        }
    }

    report
}

/// Build songs for supported image files in `image_dir` that no song
/// references yet.
///
/// Files are grouped by base name: `name.png` becomes the default variant
/// and `name-live.png` the `live` variant of song `name`. A lone default
/// image is stored as `image`, anything else as `images`.
pub fn find_unreferenced_songs(config: &Config, image_dir: &Path) -> Result<Vec<Song>> {
    if !image_dir.is_dir() {
        return Err(Error::NotFound(image_dir.to_path_buf()));
    }

    let referenced: HashSet<&str> = config.songs.iter().flat_map(|s| s.image_files()).collect();

    // (stem, file name), sorted so base names come before their variants
    let mut candidates = Vec::new();
    for entry in fs::read_dir(image_dir)? {
        let path = entry?.path();
        if !path.is_file() || !has_supported_extension(&path) {
            continue;
        }
        let (Some(file), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|n| n.to_str()),
        ) else {
            continue;
        };
        if !referenced.contains(file) {
            candidates.push((stem.to_string(), file.to_string()));
        }
    }
    candidates.sort();

    let mut used = vec![false; candidates.len()];
    let mut songs: Vec<Song> = Vec::new();

    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let (base, file) = &candidates[i];

        let mut variants = VariantMap::new();
        variants.insert(DEFAULT_VARIANT.to_string(), file.clone());

        let prefix = format!("{}-", base);
        for j in 0..candidates.len() {
            if used[j] {
                continue;
            }
            if let Some(suffix) = candidates[j].0.strip_prefix(&prefix) {
                if !suffix.is_empty() {
                    variants.insert(suffix.to_string(), candidates[j].1.clone());
                    used[j] = true;
                }
            }
        }

        // Same stem with another extension: the first file keeps the name
        if songs.iter().any(|s| s.nickname == *base) {
            log::warn!("Skipping {}: song '{}' already added", file, base);
            continue;
        }

        let song = if variants.len() == 1 {
            Song::with_image(base.clone(), file.clone())
        } else {
            Song::with_variants(base.clone(), variants)
        };
        songs.push(song);
    }

    Ok(songs)
}

/// Append songs for unreferenced images and return what was added.
pub fn add_missing(config: &mut Config, image_dir: &Path) -> Result<Vec<Song>> {
    let added = find_unreferenced_songs(config, image_dir)?;
    config.songs.extend(added.iter().cloned());
    Ok(added)
}

/// Sort songs case-insensitively by nickname.
///
/// Returns `false` if they were already in order.
pub fn sort_songs(config: &mut Config) -> bool {
    let key = |s: &Song| s.nickname.to_lowercase();
    let sorted = config.songs.windows(2).all(|w| key(&w[0]) <= key(&w[1]));
    if sorted {
        return false;
    }
    config.songs.sort_by_key(key);
    true
}
