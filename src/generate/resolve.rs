//! Turning gig song references into document entries.

use crate::config::{Config, Gig, SongRef, VariantMap};
use crate::model::{Document, Entry, SetEntries};
use crate::raster::prepare;
use crate::render::ImageAssets;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A document with its prepared images.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub document: Document,
    pub assets: ImageAssets,
}

/// Resolves song references against a configuration.
///
/// Every reference becomes exactly one entry: either the prepared image or
/// an error placeholder describing what went wrong.
pub struct Resolver<'a> {
    songs: HashMap<String, VariantMap>,
    image_dir: &'a Path,
    image_override: Option<&'a str>,
    label: &'a str,
}

impl<'a> Resolver<'a> {
    /// `label` prefixes warnings, usually the gig file name.
    pub fn new(config: &Config, image_dir: &'a Path, label: &'a str) -> Self {
        Self {
            songs: config.song_map(),
            image_dir,
            image_override: None,
            label,
        }
    }

    /// Prefer this variant for every song that has it.
    pub fn with_image_override(mut self, variant: Option<&'a str>) -> Self {
        self.image_override = variant.filter(|v| !v.is_empty());
        self
    }

    /// Image path for a reference, or the error message for the placeholder.
    pub fn image_path(&self, reference: &str) -> Result<PathBuf, String> {
        let song = SongRef::parse(reference);
        let variants = self
            .songs
            .get(song.nickname)
            .ok_or_else(|| format!("No configuration found for song '{}'", song.nickname))?;

        let variant = match self.image_override {
            Some(name) if variants.contains_key(name) => name,
            _ => song.variant,
        };
        let file = variants.get(variant).ok_or_else(|| {
            format!("No image '{}' found for song '{}'", variant, song.nickname)
        })?;

        let path = Path::new(file);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.image_dir.join(path)
        })
    }

    /// Resolve one reference, preparing its image into `assets` if needed.
    pub fn entry(&self, reference: &str, assets: &mut ImageAssets) -> Entry {
        let path = match self.image_path(reference) {
            Ok(path) => path,
            Err(message) => return self.error(message),
        };
        if !path.is_file() {
            return self.error(format!("Image file not found: {}", path.display()));
        }

        let key = path.display().to_string();
        if let Some(prepared) = assets.get(&key) {
            return Entry::image(key, prepared.width, prepared.height);
        }

        match prepare(&path, reference) {
            Ok(prepared) => {
                let entry = Entry::image(key.clone(), prepared.width, prepared.height);
                assets.insert(key, prepared);
                entry
            }
            Err(e) => {
                log::warn!(
                    "{}: Warning: Could not process image {}: {}",
                    self.label,
                    path.display(),
                    e
                );
                Entry::error(format!("Could not process image: {}", path.display()))
            }
        }
    }

    /// Resolve a whole gig.
    pub fn resolve(&self, gig: &Gig) -> Resolved {
        let mut assets = ImageAssets::new();
        let mut document = Document::new(gig.name.clone());

        for set in &gig.sets {
            let mut entries = SetEntries::new(set.name.clone());
            for reference in &set.songs {
                entries.push(self.entry(reference, &mut assets));
            }
            document.add_set(entries);
        }

        Resolved { document, assets }
    }

    fn error(&self, message: String) -> Entry {
        log::warn!("{}: Warning: {}", self.label, message);
        Entry::error(message)
    }
}
