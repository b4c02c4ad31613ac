//! JSON Schema for gig files, for editor autocompletion of song references.

use super::{Config, DEFAULT_VARIANT};
use crate::error::{Error, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

const MAX_EXAMPLES: usize = 10;

/// Every valid song reference: each nickname, followed by
/// `nickname#variant` for the non-default variants of songs with more
/// than one image.
pub fn song_completions(config: &Config) -> Vec<String> {
    let mut completions = Vec::new();
    for song in &config.songs {
        completions.push(song.nickname.clone());

        let Some(images) = song.images.as_ref().filter(|m| m.len() > 1) else {
            continue;
        };
        completions.extend(
            images
                .keys()
                .filter(|v| *v != DEFAULT_VARIANT)
                .map(|v| format!("{}#{}", song.nickname, v)),
        );
    }
    completions
}

/// Build the gig schema for a configuration.
pub fn gig_schema(config: &Config) -> Value {
    let completions = song_completions(config);
    let examples: Vec<String> = completions.iter().take(MAX_EXAMPLES).cloned().collect();

    json!({
        "$schema": SCHEMA_DRAFT,
        "title": "Gig Configuration Schema",
        "description": "Schema for gigsheets gig YAML files with autocomplete for songs and image variants",
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Name of the gig"
            },
            "sets": {
                "type": "array",
                "description": "List of sets in the gig",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Name of the set"
                        },
                        "songs": {
                            "type": "array",
                            "description": "List of songs in the set",
                            "items": {
                                "type": "string",
                                "description": "Song nickname, optionally with image variant (e.g., 'song1' or 'song1#v2')",
                                "enum": completions,
                                "examples": examples
                            }
                        }
                    },
                    "required": ["name", "songs"]
                }
            }
        },
        "required": ["name", "sets"]
    })
}

/// Write a schema as pretty-printed JSON, creating the parent directory.
pub fn write_schema<P: AsRef<Path>>(schema: &Value, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let text = serde_json::to_string_pretty(schema)
        .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Song;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::from_yaml(
            r#"
songs:
  - nickname: ballad
    image: ballad.png
  - nickname: rocker
    images:
      default: rocker.png
      acoustic: rocker-acoustic.png
  - nickname: solo
    images:
      live: solo-live.png
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_song_completions() {
        assert_eq!(
            song_completions(&config()),
            vec!["ballad", "rocker", "rocker#acoustic", "solo"]
        );
    }

    #[test]
    fn test_schema_shape() {
        let schema = gig_schema(&config());
        assert_eq!(schema["$schema"], SCHEMA_DRAFT);
        assert_eq!(schema["required"], json!(["name", "sets"]));
        let items = &schema["properties"]["sets"]["items"]["properties"]["songs"]["items"];
        assert_eq!(items["enum"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_examples_limited() {
        let mut config = Config::default();
        for i in 0..15 {
            config.songs.push(Song::with_image(format!("s{}", i), "x.png"));
        }
        let schema = gig_schema(&config);
        let items = &schema["properties"]["sets"]["items"]["properties"]["songs"]["items"];
        assert_eq!(items["enum"].as_array().unwrap().len(), 15);
        assert_eq!(items["examples"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_write_schema_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".vscode").join("gig-schema.json");
        write_schema(&gig_schema(&config()), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"title\": \"Gig Configuration Schema\""));
    }
}
