//! Self-update from GitHub releases, and the periodic background check.

use crate::status;
use chrono::Utc;
use colored::Colorize;
use self_update::backends::github::{ReleaseList, Update};
use self_update::cargo_crate_version;
use semver::Version;
use std::env::consts::{ARCH, OS};
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const REPO_OWNER: &str = "stuartleeks";
const REPO_NAME: &str = "gig-sheets";
const BIN_NAME: &str = "gigsheets";
const CLI_CRATE_NAME: &str = "gigsheets-cli";

/// Setting this to any value disables the periodic check.
pub const SKIP_UPDATE_ENV: &str = "GIGSHEETS_SKIP_UPDATE";

/// How long the CLI waits for a background check before exiting.
const RESULT_WAIT: Duration = Duration::from_millis(500);

type UpdateResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Naming of release archives for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Platform {
    /// `windows`, `linux` or `darwin`
    os: String,
    /// `x86_64` or `arm64`
    arch: String,
    triple: String,
    archive_ext: &'static str,
}

impl Platform {
    fn current() -> Self {
        Self::from_consts(OS, ARCH)
    }

    fn from_consts(os: &str, arch: &str) -> Self {
        let os_name = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch_name = match arch {
            "aarch64" => "arm64",
            other => other,
        };
        let triple = match (os, arch) {
            ("windows", a) => format!("{}-pc-windows-msvc", a),
            ("linux", a) => format!("{}-unknown-linux-gnu", a),
            ("macos", a) => format!("{}-apple-darwin", a),
            _ => "unknown".to_string(),
        };

        Self {
            os: os_name.to_string(),
            arch: arch_name.to_string(),
            triple,
            archive_ext: if os == "windows" { "zip" } else { "tar.gz" },
        }
    }

    /// Archive names a release might use for this platform, best first.
    fn asset_candidates(&self, version: &Version) -> Vec<String> {
        let ext = self.archive_ext;
        vec![
            format!("{BIN_NAME}_{version}_{}_{}.{ext}", self.os, self.arch),
            format!("{BIN_NAME}-{}-{}-v{version}.{ext}", self.os, self.arch),
            format!("{BIN_NAME}-{}-v{version}.{ext}", self.triple),
        ]
    }

    /// Target strings handed to `self_update`, matched against asset names.
    fn update_targets(&self) -> [String; 3] {
        [
            format!("{}_{}", self.os, self.arch),
            format!("{}-{}", self.os, self.arch),
            self.triple.clone(),
        ]
    }
}

/// First candidate present among the release's assets.
fn pick_asset<'a>(candidates: &'a [String], assets: &[String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|candidate| assets.contains(*candidate))
        .map(String::as_str)
}

/// Newest published release.
struct LatestRelease {
    version: Version,
    notes: Option<String>,
    assets: Vec<String>,
}

fn parse_version(tag: &str) -> Result<Version, semver::Error> {
    Version::parse(tag.trim_start_matches('v'))
}

fn fetch_latest() -> UpdateResult<Option<LatestRelease>> {
    let releases = ReleaseList::configure()
        .repo_owner(REPO_OWNER)
        .repo_name(REPO_NAME)
        .build()?
        .fetch()?;

    let Some(release) = releases.into_iter().next() else {
        return Ok(None);
    };
    Ok(Some(LatestRelease {
        version: parse_version(&release.version)?,
        notes: release.body.filter(|notes| !notes.trim().is_empty()),
        assets: release.assets.into_iter().map(|a| a.name).collect(),
    }))
}

fn current_version() -> UpdateResult<Version> {
    Ok(parse_version(cargo_crate_version!())?)
}

/// Outcome of a background update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub current: Version,
    pub latest: Version,
}

impl UpdateCheck {
    pub fn has_update(&self) -> bool {
        self.latest > self.current
    }
}

/// Start the periodic update check if one is due.
///
/// Returns a receiver for the result, or `None` when the check is skipped
/// (disabled through the environment, or performed within the last 24
/// hours). The check time is recorded as soon as the check starts.
pub fn start_periodic_check() -> Option<mpsc::Receiver<UpdateCheck>> {
    if std::env::var_os(SKIP_UPDATE_ENV).is_some_and(|v| !v.is_empty()) {
        return None;
    }

    let dir = status::status_dir();
    let mut state = status::load(&dir)
        .map_err(|e| log::warn!("Error loading status file: {}", e))
        .ok()?;

    let now = Utc::now();
    if !state.update_check_due(now) {
        return None;
    }
    state.last_update_check = Some(now);
    if let Err(e) = status::save(&dir, &state) {
        log::warn!("Error saving last update check time: {}", e);
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || match check_latest() {
        Ok(Some(check)) => {
            let _ = tx.send(check);
        }
        Ok(None) => {}
        Err(e) => log::debug!("Update check failed: {}", e),
    });
    Some(rx)
}

fn check_latest() -> UpdateResult<Option<UpdateCheck>> {
    let current = current_version()?;
    Ok(fetch_latest()?.map(|release| UpdateCheck {
        current,
        latest: release.version,
    }))
}

/// Collect the background result if it arrives within a short wait.
pub fn try_get_update_result(rx: &mpsc::Receiver<UpdateCheck>) -> Option<UpdateCheck> {
    rx.recv_timeout(RESULT_WAIT).ok()
}

/// Tell the user about a newer release.
pub fn print_update_notification(check: &UpdateCheck) {
    if !check.has_update() {
        return;
    }
    println!();
    println!(
        "{} {} → {} available! Run '{}' to update.",
        "Update:".yellow().bold(),
        check.current,
        check.latest.to_string().green(),
        "gigsheets update".cyan()
    );
}

/// Whether the running binary lives in a cargo bin directory.
fn installed_by_cargo() -> bool {
    std::env::current_exe().is_ok_and(|exe| {
        exe.components()
            .any(|c| c.as_os_str().to_string_lossy() == ".cargo")
    })
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// `gigsheets update`.
pub fn run_update(check_only: bool, yes: bool) -> UpdateResult<()> {
    let current = current_version()?;
    println!("{} {}", "Current version:".cyan().bold(), current);
    println!("{}", "Checking for updates...".cyan());

    let Some(latest) = fetch_latest()? else {
        println!("{}", "No releases found on GitHub.".yellow());
        return Ok(());
    };
    println!("{} {}", "Latest version:".cyan().bold(), latest.version);

    if latest.version <= current {
        println!();
        println!("{} No updates available", "✓".green().bold());
        return Ok(());
    }

    println!();
    println!(
        "{} New version available: {} → {}",
        "↑".yellow().bold(),
        current.to_string().yellow(),
        latest.version.to_string().green().bold()
    );
    if let Some(notes) = &latest.notes {
        println!();
        println!("{}", "Release notes:".bold());
        println!("{}", notes.trim());
    }

    if check_only {
        return Ok(());
    }

    if installed_by_cargo() {
        println!();
        println!("{} Installed via cargo. Please run:", "Note:".yellow().bold());
        println!("  {}", format!("cargo install {}", CLI_CRATE_NAME).cyan().bold());
        return Ok(());
    }

    println!();
    if !yes && !confirm("Do you want to update? (y/n):")? {
        println!("{}", "Update cancelled.".dimmed());
        return Ok(());
    }

    let platform = Platform::current();
    let candidates = platform.asset_candidates(&latest.version);
    let Some(asset) = pick_asset(&candidates, &latest.assets) else {
        println!("{}", "No release archive for this platform. Looked for:".red());
        for name in &candidates {
            println!("  - {}", name.dimmed());
        }
        println!("{} {}", "Available:".dimmed(), latest.assets.join(", "));
        return Err("No compatible binary found for this platform".into());
    };
    println!("{}", format!("Downloading {}...", asset).cyan());

    install(&platform, &current)
}

/// Try each target naming until `self_update` finds and installs a binary.
fn install(platform: &Platform, current: &Version) -> UpdateResult<()> {
    let current = current.to_string();
    let mut failures = Vec::new();

    for target in platform.update_targets() {
        log::debug!("Trying update target {}", target);
        let status = Update::configure()
            .repo_owner(REPO_OWNER)
            .repo_name(REPO_NAME)
            .bin_name(BIN_NAME)
            .target(&target)
            .current_version(&current)
            .show_download_progress(true)
            .no_confirm(true)
            .build()
            .and_then(|updater| updater.update());

        match status {
            Ok(self_update::Status::UpToDate(v)) => {
                println!("{} Already up to date (v{})", "✓".green().bold(), v);
                return Ok(());
            }
            Ok(self_update::Status::Updated(v)) => {
                println!();
                println!("{} Successfully updated to version {}", "✓".green().bold(), v);
                return Ok(());
            }
            Err(e) => failures.push(format!("{}: {}", target, e)),
        }
    }

    Err(format!("error occurred while updating binary ({})", failures.join("; ")).into())
}
