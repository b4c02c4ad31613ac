//! Persistent CLI status (`gigsheets-status.json`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STATUS_FILE: &str = "gigsheets-status.json";
const STATUS_PATH_ENV: &str = "GIGSHEETS_STATUS_PATH";

/// Minimum time between automatic update checks.
pub const CHECK_INTERVAL_HOURS: i64 = 24;

/// Contents of the status file.
///
/// Unknown keys are kept so older and newer versions can share the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(
        rename = "lastUpdateCheck",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update_check: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Status {
    /// Whether enough time has passed since the last update check.
    pub fn update_check_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_update_check {
            Some(last) => now >= last + Duration::hours(CHECK_INTERVAL_HOURS),
            None => true,
        }
    }
}

/// Directory holding the status file: `$GIGSHEETS_STATUS_PATH`, else
/// `.gigsheets` under the home directory.
pub fn status_dir() -> PathBuf {
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
    resolve_status_dir(env(STATUS_PATH_ENV), env("HOME").or_else(|| env("USERPROFILE")))
}

fn resolve_status_dir(explicit: Option<String>, home: Option<String>) -> PathBuf {
    match (explicit, home) {
        (Some(path), _) => PathBuf::from(path),
        (None, Some(home)) => Path::new(&home).join(".gigsheets"),
        (None, None) => PathBuf::from(".gigsheets"),
    }
}

/// Path of the status file in `dir`.
pub fn status_file(dir: &Path) -> PathBuf {
    dir.join(STATUS_FILE)
}

/// Read the status file; a missing file yields the default status.
pub fn load(dir: &Path) -> Result<Status, Box<dyn std::error::Error>> {
    match fs::read_to_string(status_file(dir)) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Status::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write the status file, creating its directory.
pub fn save(dir: &Path, status: &Status) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    fs::write(status_file(dir), serde_json::to_string_pretty(status)?)?;
    Ok(())
}
