//! File watching with debounce for `--watch`.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quiet period that ends a burst of change notifications.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Something to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// A single file. Its directory is watched so editors that replace the
    /// file on save are still noticed.
    File(PathBuf),

    /// Every file directly inside a directory.
    Dir(PathBuf),
}

impl WatchTarget {
    fn canonical(self) -> std::io::Result<Self> {
        Ok(match self {
            WatchTarget::Dir(dir) => WatchTarget::Dir(fs::canonicalize(dir)?),
            WatchTarget::File(file) => {
                let parent = match file.parent().filter(|p| !p.as_os_str().is_empty()) {
                    Some(parent) => fs::canonicalize(parent)?,
                    None => std::env::current_dir()?,
                };
                let name = file.file_name().map(PathBuf::from).unwrap_or_default();
                WatchTarget::File(parent.join(name))
            }
        })
    }

    fn watch_dir(&self) -> &Path {
        match self {
            WatchTarget::Dir(dir) => dir,
            WatchTarget::File(file) => file.parent().unwrap_or(file),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match self {
            WatchTarget::Dir(dir) => path.parent() == Some(dir.as_path()),
            WatchTarget::File(file) => path == file,
        }
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Watches targets and reports debounced changes.
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<PathBuf>,
}

impl ChangeWatcher {
    /// Start watching.
    pub fn new(targets: Vec<WatchTarget>) -> Result<Self, Box<dyn std::error::Error>> {
        let targets = targets
            .into_iter()
            .map(WatchTarget::canonical)
            .collect::<std::io::Result<Vec<_>>>()?;

        let (tx, rx): (Sender<PathBuf>, Receiver<PathBuf>) = unbounded();
        let filter = targets.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_change(&event.kind) => {
                    for path in event.paths {
                        if filter.iter().any(|t| t.matches(&path)) {
                            let _ = tx.send(path);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Watcher error: {}", e),
            }
        })?;

        for target in &targets {
            watcher.watch(target.watch_dir(), RecursiveMode::NonRecursive)?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Block until a burst of changes has settled and return the last
    /// changed path. `None` once the watcher has stopped.
    pub fn next_change(&self) -> Option<PathBuf> {
        debounce(&self.rx, DEBOUNCE)
    }
}

/// Wait for one event, then keep absorbing events until `window` passes
/// without a new one.
pub fn debounce<T>(rx: &Receiver<T>, window: Duration) -> Option<T> {
    let mut last = rx.recv().ok()?;
    loop {
        match rx.recv_timeout(window) {
            Ok(next) => last = next,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Some(last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_debounce_collapses_burst() {
        let (tx, rx) = unbounded();
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        assert_eq!(debounce(&rx, Duration::from_millis(20)), Some(4));
    }

    #[test]
    fn test_debounce_separates_bursts() {
        let (tx, rx) = unbounded();
        let sender = thread::spawn(move || {
            tx.send("first").unwrap();
            thread::sleep(Duration::from_millis(200));
            tx.send("second").unwrap();
        });
        assert_eq!(debounce(&rx, Duration::from_millis(50)), Some("first"));
        assert_eq!(debounce(&rx, Duration::from_millis(50)), Some("second"));
        sender.join().unwrap();
        assert_eq!(debounce(&rx, Duration::from_millis(50)), None::<&str>);
    }

    #[test]
    fn test_target_matching() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        fs::write(&config, "songs: []\n").unwrap();

        let file = WatchTarget::File(config.clone()).canonical().unwrap();
        let canonical_dir = fs::canonicalize(dir.path()).unwrap();
        assert!(file.matches(&canonical_dir.join("config.yaml")));
        assert!(!file.matches(&canonical_dir.join("other.yaml")));
        assert_eq!(file.watch_dir(), canonical_dir.as_path());

        let gigs = WatchTarget::Dir(dir.path().to_path_buf()).canonical().unwrap();
        assert!(gigs.matches(&canonical_dir.join("friday.yaml")));
        assert!(!gigs.matches(&canonical_dir.join("sub").join("friday.yaml")));
    }
}
