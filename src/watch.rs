use crate::pipeline::RunReport;
use crate::scanner::{modified, FileScanner};
use anyhow::Result;
use log::{debug, error, info};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, SystemTime};

/// Polling change detector.
///
/// Directories contribute the newest modification time of the files beneath them,
/// plain files their own. By default only Rust files count inside directories; with
/// [`Watcher::any_file`] every file does, except the ignored ones. A run is due whenever
/// that time advances past the one seen at the previous run.
pub struct Watcher {
    paths: Vec<PathBuf>,
    interval: Duration,
    any_file: bool,
    ignored: Vec<PathBuf>,
    last_seen: Option<SystemTime>,
}

impl Watcher {
    pub fn new(paths: Vec<PathBuf>, interval: Duration) -> Self {
        Self {
            paths,
            interval,
            any_file: false,
            ignored: Vec::new(),
            last_seen: None,
        }
    }

    /// Counts files of any kind inside watched directories.
    pub fn any_file(mut self) -> Self {
        self.any_file = true;
        self
    }

    /// Files whose changes never trigger a run, such as the generated artifacts.
    pub fn ignoring(mut self, paths: Vec<PathBuf>) -> Self {
        self.ignored = paths;
        self
    }

    /// Newest modification time among the watched paths.
    pub fn latest_modification(&self) -> Option<SystemTime> {
        // Artifacts may not exist yet; resolve them per poll
        let ignored: Vec<PathBuf> = self
            .ignored
            .iter()
            .filter_map(|path| path.canonicalize().ok())
            .collect();
        let counts = |path: &PathBuf| {
            ignored.is_empty()
                || path
                    .canonicalize()
                    .map_or(true, |resolved| !ignored.contains(&resolved))
        };

        self.paths
            .iter()
            .filter_map(|path| {
                if path.is_dir() {
                    let scanner = FileScanner::new(path.clone());
                    let scanner = if self.any_file { scanner.any_file() } else { scanner };
                    scanner.scan().ok().and_then(|result| {
                        result
                            .files
                            .iter()
                            .filter(|&file| counts(file))
                            .filter_map(|file| modified(file))
                            .max()
                    })
                } else {
                    modified(path)
                }
            })
            .max()
    }

    /// Whether anything changed since the previous call that returned `true`.
    pub fn poll_once(&mut self) -> bool {
        let current = self.latest_modification();
        if current > self.last_seen {
            debug!("Watched paths modified at {:?}", current);
            self.last_seen = current;
            true
        } else {
            false
        }
    }

    /// Polls forever, calling `on_change` after every detected change. A failed run is
    /// logged and watching continues.
    pub fn run<F>(&mut self, mut on_change: F) -> !
    where
        F: FnMut() -> Result<RunReport>,
    {
        info!("Watch mode enabled. Press Ctrl+C to stop.");
        loop {
            if self.poll_once() {
                info!("Changes detected. Regenerating documentation...");
                match on_change() {
                    Ok(report) => info!(
                        "Documented {} routes into {} artifacts",
                        report.routes,
                        report.artifacts.len()
                    ),
                    Err(e) => error!("Documentation run failed: {:#}", e),
                }
            }
            thread::sleep(self.interval);
        }
    }
}
