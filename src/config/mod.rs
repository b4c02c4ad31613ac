//! Song library configuration (`config.yaml`).
//!
//! ```yaml
//! imageFolder: images
//! gigsFolder: gigs
//! outputFolder: output
//! spacing: 5
//! songs:
//!   - nickname: ballad
//!     image: ballad.png
//!   - nickname: rocker
//!     images:
//!       default: rocker.png
//!       acoustic: rocker-acoustic.png
//! ```
//!
//! Folder paths are relative to the directory holding the config file.

mod gig;
mod schema;
mod validate;

pub use gig::{discover_gigs, Gig, GigSet, SongRef, ALL_SONGS};
pub use schema::{gig_schema, song_completions, write_schema, SCHEMA_DRAFT};
pub use validate::{
    add_missing, find_unreferenced_songs, sort_songs, validate, ImageCheck, ValidationReport,
};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Variant used when a song reference carries no `#variant` suffix.
pub const DEFAULT_VARIANT: &str = "default";

/// Variant name -> image path.
pub type VariantMap = BTreeMap<String, String>;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub image_folder: String,

    #[serde(default)]
    pub gigs_folder: String,

    #[serde(default)]
    pub output_folder: String,

    /// Gap between placed images in millimetres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    #[serde(default)]
    pub songs: Vec<Song>,
}

/// One song and the image(s) that represent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub nickname: String,

    /// Single image, stored as the default variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Named image variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<VariantMap>,
}

impl Song {
    /// Create a song with a single default image.
    pub fn with_image(nickname: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            image: Some(image.into()),
            images: None,
        }
    }

    /// Create a song with named variants.
    pub fn with_variants(nickname: impl Into<String>, images: VariantMap) -> Self {
        Self {
            nickname: nickname.into(),
            image: None,
            images: Some(images),
        }
    }

    /// All variants of this song. A legacy `image` becomes the default
    /// variant unless `images` names one explicitly.
    pub fn variants(&self) -> VariantMap {
        let mut variants = VariantMap::new();
        if let Some(image) = self.image.as_deref().filter(|i| !i.is_empty()) {
            variants.insert(DEFAULT_VARIANT.to_string(), image.to_string());
        }
        if let Some(images) = &self.images {
            variants.extend(images.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        variants
    }

    /// Every image file name this song references.
    pub fn image_files(&self) -> impl Iterator<Item = &str> {
        self.image
            .as_deref()
            .filter(|i| !i.is_empty())
            .into_iter()
            .chain(self.images.iter().flat_map(|m| m.values().map(String::as_str)))
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("failed to parse config YAML: {}", e)))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration back to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Song nickname -> variants, for reference lookup.
    ///
    /// If a nickname appears twice, the later song wins.
    pub fn song_map(&self) -> HashMap<String, VariantMap> {
        self.songs
            .iter()
            .map(|song| (song.nickname.clone(), song.variants()))
            .collect()
    }

    /// Resolve the folders relative to `config_path`.
    ///
    /// `output_override` replaces `outputFolder`; a relative override is
    /// also taken relative to the config directory.
    pub fn paths(&self, config_path: &Path, output_override: Option<&Path>) -> ConfigPaths {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let output_dir = match output_override {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => config_dir.join(dir),
            None => config_dir.join(&self.output_folder),
        };

        ConfigPaths {
            image_dir: config_dir.join(&self.image_folder),
            gigs_dir: config_dir.join(&self.gigs_folder),
            output_dir,
            config_dir,
        }
    }
}

/// Folders resolved against the config file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub image_dir: PathBuf,
    pub gigs_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
imageFolder: images
gigsFolder: gigs
outputFolder: output
spacing: 3
songs:
  - nickname: ballad
    image: ballad.png
  - nickname: rocker
    images:
      default: rocker.png
      acoustic: rocker-acoustic.png
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.image_folder, "images");
        assert_eq!(config.spacing, Some(3.0));
        assert_eq!(config.songs.len(), 2);
        assert_eq!(config.songs[0].image.as_deref(), Some("ballad.png"));
    }

    #[test]
    fn test_spacing_is_optional() {
        let config = Config::from_yaml("imageFolder: i\nsongs: []\n").unwrap();
        assert_eq!(config.spacing, None);
        assert!(!config.to_yaml().unwrap().contains("spacing"));
    }

    #[test]
    fn test_song_map_maps_legacy_image_to_default() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let map = config.song_map();
        assert_eq!(map["ballad"]["default"], "ballad.png");
        assert_eq!(map["rocker"]["acoustic"], "rocker-acoustic.png");
        assert_eq!(map["rocker"].len(), 2);
    }

    #[test]
    fn test_empty_image_is_ignored() {
        let song = Song {
            nickname: "x".to_string(),
            image: Some(String::new()),
            images: None,
        };
        assert!(song.variants().is_empty());
        assert_eq!(song.image_files().count(), 0);
    }

    #[test]
    fn test_paths_relative_to_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let paths = config.paths(Path::new("/band/config.yaml"), None);
        assert_eq!(paths.image_dir, PathBuf::from("/band/images"));
        assert_eq!(paths.gigs_dir, PathBuf::from("/band/gigs"));
        assert_eq!(paths.output_dir, PathBuf::from("/band/output"));

        let paths = config.paths(Path::new("config.yaml"), None);
        assert_eq!(paths.image_dir, PathBuf::from("images"));
    }

    #[test]
    fn test_output_override() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let relative = config.paths(Path::new("/band/config.yaml"), Some(Path::new("print")));
        assert_eq!(relative.output_dir, PathBuf::from("/band/print"));

        let absolute = config.paths(Path::new("/band/config.yaml"), Some(Path::new("/tmp/out")));
        assert_eq!(absolute.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/definitely/not/here/config.yaml");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
