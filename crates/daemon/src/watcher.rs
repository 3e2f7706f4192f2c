use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// A file change event emitted by the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Created,
    Modified,
}

impl FileChangeEvent {
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FileChangeKind::Modified,
        }
    }
}

/// Start watching the given directories, sending file change events to the channel.
/// Returns the watcher handle (must be kept alive).
pub fn start_watcher(
    paths: &[PathBuf],
    tx: mpsc::UnboundedSender<FileChangeEvent>,
) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                let kind = match event.kind {
                    notify::EventKind::Create(_) => FileChangeKind::Created,
                    notify::EventKind::Modify(_) => FileChangeKind::Modified,
                    _ => return,
                };
                for path in event.paths {
                    if is_session_file(&path) {
                        debug!("File change detected: {} ({:?})", path.display(), kind);
                        let _ = tx.send(FileChangeEvent { path, kind });
                    }
                }
            }
            Err(e) => {
                error!("Watcher error: {}", e);
            }
        }
    })
    .context("Failed to create file watcher")?;

    for path in paths {
        watch_dir(&mut watcher, path);
    }

    Ok(watcher)
}

/// Add a recursive watch on `path`. Failure is logged, not fatal.
pub fn watch_dir(watcher: &mut impl Watcher, path: &Path) -> bool {
    match watcher.watch(path, RecursiveMode::Recursive) {
        Ok(()) => {
            info!("Watching directory: {}", path.display());
            true
        }
        Err(e) => {
            warn!("Failed to watch {}: {}", path.display(), e);
            false
        }
    }
}

/// Transcripts are `.json` or `.jsonl`; anything else is noise.
pub fn is_session_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    matches!(ext, "jsonl" | "json")
}
