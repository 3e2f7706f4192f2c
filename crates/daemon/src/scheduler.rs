use agentlog_core::SessionStore;
use agentlog_parsers::{Importer, SourceDir};
use notify::Watcher;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::debounce::Debounce;
use crate::watcher::{is_session_file, watch_dir, FileChangeEvent};

/// Maps change events to tools and keeps one debounce timer per tool, so a
/// burst of writes to any number of files triggers a single import.
pub struct Scheduler {
    sources: Vec<SourceDir>,
    timers: BTreeMap<String, Debounce>,
    /// Tools whose source directory did not exist yet.
    missing: Vec<String>,
}

impl Scheduler {
    /// Disabled sources are dropped.
    pub fn new(sources: Vec<SourceDir>, debounce: Duration) -> Self {
        let sources: Vec<SourceDir> = sources.into_iter().filter(|s| s.enabled).collect();
        let timers = sources
            .iter()
            .map(|s| (s.tool.clone(), Debounce::new(debounce)))
            .collect();
        let missing = sources
            .iter()
            .filter(|s| !s.path.is_dir())
            .map(|s| s.tool.clone())
            .collect();
        Self {
            sources,
            timers,
            missing,
        }
    }

    /// Source directories that were missing and exist now. Each one is
    /// reported once.
    pub fn appeared(&mut self) -> Vec<SourceDir> {
        let mut found = Vec::new();
        let sources = &self.sources;
        self.missing.retain(|tool| {
            match sources.iter().find(|s| &s.tool == tool) {
                Some(source) if source.path.is_dir() => {
                    found.push(source.clone());
                    false
                }
                _ => true,
            }
        });
        found
    }

    /// Arm the timer of `tool` directly, without a file event.
    pub fn arm(&mut self, tool: &str, now: Instant) {
        if let Some(timer) = self.timers.get_mut(tool) {
            timer.on_event(now);
        }
    }

    /// Tool whose source directory contains `path`. The most specific
    /// directory wins when sources are nested.
    pub fn route(&self, path: &Path) -> Option<&str> {
        if !is_session_file(path) {
            return None;
        }
        self.sources
            .iter()
            .filter(|s| path.starts_with(&s.path))
            .max_by_key(|s| s.path.components().count())
            .map(|s| s.tool.as_str())
    }

    /// Arm the timer of the tool owning `path`. Returns that tool.
    pub fn on_change(&mut self, path: &Path, now: Instant) -> Option<String> {
        let tool = self.route(path)?.to_string();
        self.arm(&tool, now);
        Some(tool)
    }

    /// Sources whose quiet period has elapsed. Each firing is reported once.
    pub fn due(&mut self, now: Instant) -> Vec<SourceDir> {
        let fired: Vec<String> = self
            .timers
            .iter_mut()
            .filter_map(|(tool, timer)| timer.poll(now).then(|| tool.clone()))
            .collect();
        self.sources
            .iter()
            .filter(|s| fired.contains(&s.tool))
            .cloned()
            .collect()
    }

    pub fn pending(&self) -> Vec<&str> {
        self.timers
            .iter()
            .filter(|(_, timer)| timer.is_pending())
            .map(|(tool, _)| tool.as_str())
            .collect()
    }

    pub fn cancel_all(&mut self) {
        for timer in self.timers.values_mut() {
            timer.cancel();
        }
    }
}

/// Run the scheduler loop: receives file change events, debounces per tool,
/// and re-imports the tool's directory once it goes quiet.
///
/// Every tick also looks for source directories created after startup. Such
/// a directory is added to `watcher` and gets an import of its own, since
/// files written before the watch was in place produce no events.
pub async fn run_scheduler(
    mut scheduler: Scheduler,
    mut watcher: impl Watcher,
    importer: Arc<Importer>,
    store: Arc<dyn SessionStore>,
    tick_every: Duration,
    mut rx: mpsc::UnboundedReceiver<FileChangeEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tick = tokio::time::interval(tick_every);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                match scheduler.on_change(&event.path, Instant::now()) {
                    Some(tool) => debug!("Scheduling {tool} import after change to {}", event.path.display()),
                    None => debug!("Ignoring change to {}", event.path.display()),
                }
            }

            _ = tick.tick() => {
                let now = Instant::now();
                for source in scheduler.appeared() {
                    info!("{}: source directory {} appeared", source.tool, source.path.display());
                    watch_dir(&mut watcher, &source.path);
                    scheduler.arm(&source.tool, now);
                }
                for source in scheduler.due(now) {
                    run_import(&importer, &store, source).await;
                }
            }

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    let pending = scheduler.pending().len();
                    if pending > 0 {
                        info!("Dropping {pending} pending import(s)");
                    }
                    scheduler.cancel_all();
                    info!("Scheduler shutting down");
                    break;
                }
            }
        }
    }
}

async fn run_import(importer: &Arc<Importer>, store: &Arc<dyn SessionStore>, source: SourceDir) {
    let importer = Arc::clone(importer);
    let store = Arc::clone(store);
    let tool = source.tool.clone();
    let result = tokio::task::spawn_blocking(move || {
        importer.import_tool(&source.tool, &source.path, store.as_ref())
    })
    .await;
    match result {
        Ok(0) => debug!("{tool}: no new sessions"),
        Ok(count) => info!("{tool}: imported {count} new session(s)"),
        Err(e) => error!("{tool}: import task failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::{start_watcher, FileChangeKind};
    use agentlog_core::testing::MemoryStore;
    use std::path::PathBuf;

    const DELAY: Duration = Duration::from_millis(1500);

    fn sources() -> Vec<SourceDir> {
        let mut gemini = SourceDir::new("gemini", "/home/u/.gemini/tmp");
        gemini.enabled = false;
        vec![
            SourceDir::new("claude", "/home/u/.claude/projects"),
            SourceDir::new("codex", "/home/u/.codex/sessions"),
            gemini,
        ]
    }

    #[test]
    fn test_route_by_directory_and_extension() {
        let scheduler = Scheduler::new(sources(), DELAY);
        assert_eq!(
            scheduler.route(Path::new("/home/u/.claude/projects/-p/s.jsonl")),
            Some("claude")
        );
        assert_eq!(
            scheduler.route(Path::new("/home/u/.codex/sessions/2025/01/01/r-x.jsonl")),
            Some("codex")
        );
        assert_eq!(scheduler.route(Path::new("/home/u/.claude/projects/-p/notes.txt")), None);
        assert_eq!(scheduler.route(Path::new("/home/u/.gemini/tmp/h/chats/s.json")), None);
        assert_eq!(scheduler.route(Path::new("/elsewhere/s.jsonl")), None);
    }

    #[test]
    fn test_nested_sources_pick_most_specific() {
        let scheduler = Scheduler::new(
            vec![
                SourceDir::new("claude", "/data"),
                SourceDir::new("codex", "/data/codex"),
            ],
            DELAY,
        );
        assert_eq!(scheduler.route(Path::new("/data/codex/a.jsonl")), Some("codex"));
        assert_eq!(scheduler.route(Path::new("/data/x/a.jsonl")), Some("claude"));
    }

    #[test]
    fn test_one_import_per_tool_per_burst() {
        let mut scheduler = Scheduler::new(sources(), DELAY);
        let t0 = Instant::now();
        for i in 0..5u32 {
            let path = PathBuf::from(format!("/home/u/.claude/projects/-p/s{i}.jsonl"));
            scheduler.on_change(&path, t0 + Duration::from_millis(100) * i);
        }
        scheduler.on_change(Path::new("/home/u/.codex/sessions/r-1.jsonl"), t0);
        assert_eq!(scheduler.pending(), vec!["claude", "codex"]);

        let first = scheduler.due(t0 + DELAY);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].tool, "codex");

        let second = scheduler.due(t0 + Duration::from_millis(400) + DELAY);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].tool, "claude");
        assert!(scheduler.due(t0 + DELAY * 10).is_empty());
    }

    #[tokio::test]
    async fn test_run_scheduler_imports_after_quiet_period() {
        let home = tempfile::tempdir().unwrap();
        let root = home.path().join("projects");
        let project = root.join("-Users-alice-app");
        std::fs::create_dir_all(&project).unwrap();
        let file = project.join("live.jsonl");
        std::fs::write(
            &file,
            r#"{"type":"user","message":{"content":"hello"},"timestamp":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn SessionStore> = memory.clone();
        let scheduler = Scheduler::new(
            vec![SourceDir::new("claude", &root)],
            Duration::from_millis(30),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = start_watcher(&[], tx.clone()).unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_scheduler(
            scheduler,
            watcher,
            Arc::new(Importer::with_default_adapters()),
            store,
            Duration::from_millis(10),
            rx,
            shutdown_rx,
        ));

        tx.send(FileChangeEvent {
            path: file.clone(),
            kind: FileChangeKind::Created,
        })
        .unwrap();
        tx.send(FileChangeEvent::modified(&file)).unwrap();

        let mut imported = false;
        for _ in 0..200 {
            if memory.session("live").is_some() {
                imported = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(imported);
        assert_eq!(memory.messages("live").len(), 1);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_appeared_reports_new_directories_once() {
        let home = tempfile::tempdir().unwrap();
        let present = home.path().join("claude");
        std::fs::create_dir_all(&present).unwrap();
        let late = home.path().join("codex");

        let mut scheduler = Scheduler::new(
            vec![SourceDir::new("claude", &present), SourceDir::new("codex", &late)],
            DELAY,
        );
        assert!(scheduler.appeared().is_empty());

        std::fs::create_dir_all(&late).unwrap();
        let appeared = scheduler.appeared();
        assert_eq!(appeared.len(), 1);
        assert_eq!(appeared[0].tool, "codex");
        assert!(scheduler.appeared().is_empty());
    }

    #[tokio::test]
    async fn test_run_scheduler_picks_up_late_source_directory() {
        let home = tempfile::tempdir().unwrap();
        let root = home.path().join("projects");

        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn SessionStore> = memory.clone();
        let scheduler = Scheduler::new(
            vec![SourceDir::new("claude", &root)],
            Duration::from_millis(30),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = start_watcher(&[], tx).unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_scheduler(
            scheduler,
            watcher,
            Arc::new(Importer::with_default_adapters()),
            store,
            Duration::from_millis(10),
            rx,
            shutdown_rx,
        ));

        let project = root.join("-Users-alice-late");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("fresh.jsonl"),
            r#"{"type":"user","message":{"content":"hi"},"timestamp":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let mut imported = false;
        for _ in 0..300 {
            if memory.session("fresh").is_some() {
                imported = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(imported);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
