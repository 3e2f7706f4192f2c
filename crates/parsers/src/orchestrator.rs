//! Runs registered adapters over their source directories.

use crate::{all_adapters, SessionAdapter};
use agentlog_core::SessionStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// A directory to import from and the adapter (by name) that reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir {
    pub tool: String,
    pub path: PathBuf,
    pub enabled: bool,
}

impl SourceDir {
    pub fn new(tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            path: path.into(),
            enabled: true,
        }
    }
}

/// Registry of adapters keyed by name.
#[derive(Default)]
pub struct Importer {
    adapters: BTreeMap<String, Box<dyn SessionAdapter>>,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in Claude, Codex and Gemini adapters.
    pub fn with_default_adapters() -> Self {
        let mut importer = Self::new();
        for adapter in all_adapters() {
            importer.register(adapter);
        }
        importer
    }

    /// Register under the adapter's own name. Returns the adapter it replaced.
    pub fn register(&mut self, adapter: Box<dyn SessionAdapter>) -> Option<Box<dyn SessionAdapter>> {
        let name = adapter.name().to_string();
        self.register_as(name, adapter)
    }

    pub fn register_as(
        &mut self,
        name: impl Into<String>,
        adapter: Box<dyn SessionAdapter>,
    ) -> Option<Box<dyn SessionAdapter>> {
        self.adapters.insert(name.into(), adapter)
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    pub fn adapter(&self, name: &str) -> Option<&dyn SessionAdapter> {
        self.adapters.get(name).map(|a| a.as_ref())
    }

    /// Import one tool's directory. Any failure is logged and counts as zero.
    pub fn import_tool(&self, name: &str, dir: &Path, store: &dyn SessionStore) -> usize {
        let Some(adapter) = self.adapter(name) else {
            warn!("No adapter registered for {name}");
            return 0;
        };
        match adapter.import(dir, store) {
            Ok(count) => count,
            Err(e) => {
                error!("{name}: import from {} failed: {:#}", dir.display(), e);
                0
            }
        }
    }

    /// Import every enabled source in order, returning new-session counts per tool.
    pub fn import_all(&self, sources: &[SourceDir], store: &dyn SessionStore) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for source in sources.iter().filter(|s| s.enabled) {
            let count = self.import_tool(&source.tool, &source.path, store);
            *counts.entry(source.tool.clone()).or_insert(0) += count;
        }
        let total: usize = counts.values().sum();
        info!("Imported {total} new session(s) from {} source(s)", counts.len());
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlog_core::testing::{message, session, MemoryStore};
    use agentlog_core::{ImportedSession, MessageType, StoreError, Tool};
    use std::fs;

    /// One session per directory, named after the adapter.
    struct OneShot(&'static str);

    impl SessionAdapter for OneShot {
        fn name(&self) -> &str {
            self.0
        }

        fn tool(&self) -> Tool {
            Tool::Codex
        }

        fn discover(&self, dir: &Path) -> Vec<PathBuf> {
            vec![dir.join("only")]
        }

        fn parse(&self, _path: &Path) -> anyhow::Result<Option<ImportedSession>> {
            let id = format!("{}-session", self.0);
            let msg = message(&id, MessageType::User, 0, "hi");
            Ok(Some(ImportedSession::new(session(&id, Tool::Codex), vec![msg])))
        }
    }

    /// Fails the whole directory, as a store outage would.
    struct Broken;

    impl SessionAdapter for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn tool(&self) -> Tool {
            Tool::Gemini
        }

        fn discover(&self, _dir: &Path) -> Vec<PathBuf> {
            Vec::new()
        }

        fn parse(&self, _path: &Path) -> anyhow::Result<Option<ImportedSession>> {
            Ok(None)
        }

        fn import(&self, _dir: &Path, _store: &dyn SessionStore) -> anyhow::Result<usize> {
            Err(StoreError::backend("disk full").into())
        }
    }

    #[test]
    fn test_default_registry() {
        let importer = Importer::with_default_adapters();
        assert_eq!(importer.adapter_names(), vec!["claude", "codex", "gemini"]);
        assert!(importer.adapter("codex").is_some());
        assert!(importer.adapter("cursor").is_none());
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut importer = Importer::new();
        assert!(importer.register(Box::new(OneShot("a"))).is_none());
        assert!(importer.register(Box::new(OneShot("a"))).is_some());
        importer.register_as("alias", Box::new(OneShot("b")));
        assert_eq!(importer.adapter_names(), vec!["a", "alias"]);
    }

    #[test]
    fn test_import_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good");
        fs::create_dir_all(&good).unwrap();

        let mut importer = Importer::new();
        importer.register(Box::new(OneShot("ok")));
        importer.register(Box::new(Broken));

        let mut disabled = SourceDir::new("ok", &good);
        disabled.enabled = false;
        let sources = vec![
            SourceDir::new("broken", &good),
            SourceDir::new("missing-adapter", &good),
            disabled,
            SourceDir::new("ok", &good),
        ];

        let store = MemoryStore::new();
        let counts = importer.import_all(&sources, &store);
        assert_eq!(counts.get("broken"), Some(&0));
        assert_eq!(counts.get("missing-adapter"), Some(&0));
        assert_eq!(counts.get("ok"), Some(&1));
        assert_eq!(store.session_ids(), vec!["ok-session"]);

        let again = importer.import_all(&sources, &store);
        assert_eq!(again.get("ok"), Some(&0));
    }

    #[test]
    fn test_import_tool_missing_dir_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let importer = Importer::with_default_adapters();
        let store = MemoryStore::new();
        assert_eq!(importer.import_tool("claude", &dir.path().join("nope"), &store), 0);
    }
}
