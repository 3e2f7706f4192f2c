pub mod discover;
pub mod orchestrator;

mod claude_code;
mod codex;
pub(crate) mod common;
mod gemini;

pub use claude_code::ClaudeCodeAdapter;
pub use codex::CodexAdapter;
pub use gemini::GeminiAdapter;
pub use orchestrator::{Importer, SourceDir};

use agentlog_core::{ImportedSession, SessionStore, Tool};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Converts one assistant's on-disk transcripts into normalized sessions.
pub trait SessionAdapter: Send + Sync {
    /// Adapter name (e.g. "claude", "codex")
    fn name(&self) -> &str;

    fn tool(&self) -> Tool;

    /// Session files under a source directory, in a stable order.
    fn discover(&self, dir: &Path) -> Vec<PathBuf>;

    /// Session id derivable from the path alone, without reading the file.
    fn session_id_for(&self, _path: &Path) -> Option<String> {
        None
    }

    /// Parse one file. `Ok(None)` means the file held nothing worth importing.
    fn parse(&self, path: &Path) -> Result<Option<ImportedSession>>;

    /// Import every new session under `dir`, returning how many were stored.
    ///
    /// Files whose session id is already stored are skipped. A failing file is
    /// logged and does not stop the rest of the directory.
    fn import(&self, dir: &Path, store: &dyn SessionStore) -> Result<usize> {
        import_dir(self, dir, store)
    }
}

/// Get all built-in adapters
pub fn all_adapters() -> Vec<Box<dyn SessionAdapter>> {
    vec![
        Box::new(ClaudeCodeAdapter),
        Box::new(CodexAdapter),
        Box::new(GeminiAdapter),
    ]
}

fn import_dir<A: SessionAdapter + ?Sized>(
    adapter: &A,
    dir: &Path,
    store: &dyn SessionStore,
) -> Result<usize> {
    if !dir.is_dir() {
        debug!("{}: source directory {} not found", adapter.name(), dir.display());
        return Ok(0);
    }

    let files = adapter.discover(dir);
    let mut imported = 0usize;
    for path in &files {
        match import_file(adapter, path, store) {
            Ok(true) => imported += 1,
            Ok(false) => {}
            Err(e) => warn!(
                "{}: failed to import {}: {:#}",
                adapter.name(),
                path.display(),
                e
            ),
        }
    }

    info!(
        "{}: imported {} of {} file(s) from {}",
        adapter.name(),
        imported,
        files.len(),
        dir.display()
    );
    Ok(imported)
}

fn import_file<A: SessionAdapter + ?Sized>(
    adapter: &A,
    path: &Path,
    store: &dyn SessionStore,
) -> Result<bool> {
    if let Some(id) = adapter.session_id_for(path) {
        if store.session_exists(&id)? {
            debug!("Skipping known session {id}");
            return Ok(false);
        }
    }

    let Some(imported) = adapter.parse(path)? else {
        debug!("Nothing to import from {}", path.display());
        return Ok(false);
    };

    let id = &imported.session.id;
    if store.session_exists(id)? {
        debug!("Skipping known session {id}");
        return Ok(false);
    }

    store.import_session(&imported.session, &imported.messages)?;
    debug!(
        "Imported {} ({} messages) from {}",
        id,
        imported.messages.len(),
        path.display()
    );
    Ok(true)
}
