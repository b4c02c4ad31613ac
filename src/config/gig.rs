//! Gig files: a named performance made of ordered sets of song references.

use super::{Config, DEFAULT_VARIANT};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the generated document listing every configured song.
pub const ALL_SONGS: &str = "All Songs";

/// A gig file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub sets: Vec<GigSet>,
}

/// One set of a gig.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GigSet {
    #[serde(default)]
    pub name: String,

    /// Song references, `nickname` or `nickname#variant`
    #[serde(default)]
    pub songs: Vec<String>,
}

impl Gig {
    /// Parse a gig from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a gig file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read gig file {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("failed to parse gig YAML: {}", e)))
    }

    /// A single-set gig containing every configured song, in config order.
    pub fn all_songs(config: &Config) -> Self {
        Self {
            name: ALL_SONGS.to_string(),
            sets: vec![GigSet {
                name: ALL_SONGS.to_string(),
                songs: config.songs.iter().map(|s| s.nickname.clone()).collect(),
            }],
        }
    }
}

/// A parsed song reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef<'a> {
    pub nickname: &'a str,
    pub variant: &'a str,
}

impl<'a> SongRef<'a> {
    /// Split `nickname#variant`. Without a suffix the variant is
    /// [`DEFAULT_VARIANT`]; anything after a second `#` is ignored.
    pub fn parse(reference: &'a str) -> Self {
        let mut parts = reference.split('#');
        let nickname = parts.next().unwrap_or_default();
        let variant = parts.next().unwrap_or(DEFAULT_VARIANT);
        Self { nickname, variant }
    }
}

impl fmt::Display for SongRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variant == DEFAULT_VARIANT {
            write!(f, "{}", self.nickname)
        } else {
            write!(f, "{}#{}", self.nickname, self.variant)
        }
    }
}

/// List the gig files (`*.yaml`, `*.yml`) in `dir`, sorted by file name.
pub fn discover_gigs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }

    let mut gigs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml && path.is_file() {
            gigs.push(path);
        }
    }
    gigs.sort();
    Ok(gigs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_gig() {
        let gig = Gig::from_yaml(
            "name: Friday\nsets:\n  - name: One\n    songs: [ballad, 'rocker#acoustic']\n",
        )
        .unwrap();
        assert_eq!(gig.name, "Friday");
        assert_eq!(gig.sets[0].songs, vec!["ballad", "rocker#acoustic"]);
    }

    #[test]
    fn test_song_ref_parse() {
        assert_eq!(
            SongRef::parse("ballad"),
            SongRef {
                nickname: "ballad",
                variant: "default"
            }
        );
        assert_eq!(SongRef::parse("ballad#acoustic").variant, "acoustic");
        assert_eq!(SongRef::parse("a#b#c").variant, "b");
        assert_eq!(SongRef::parse("ballad#").variant, "");
        assert_eq!(SongRef::parse("ballad#acoustic").to_string(), "ballad#acoustic");
    }

    #[test]
    fn test_all_songs_gig() {
        let config = Config::from_yaml(
            "songs:\n  - nickname: b\n    image: b.png\n  - nickname: a\n    image: a.png\n",
        )
        .unwrap();
        let gig = Gig::all_songs(&config);
        assert_eq!(gig.name, ALL_SONGS);
        assert_eq!(gig.sets.len(), 1);
        assert_eq!(gig.sets[0].songs, vec!["b", "a"]);
    }

    #[test]
    fn test_discover_gigs_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.yml", "a.yaml", "c.yaml", "notes.txt"] {
            fs::write(dir.path().join(name), "name: x\n").unwrap();
        }
        fs::create_dir(dir.path().join("sub.yaml")).unwrap();

        let gigs = discover_gigs(dir.path()).unwrap();
        let names: Vec<_> = gigs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml", "c.yaml"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let result = discover_gigs("/no/such/gigs/dir");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
