//! File watching and debounced re-import of transcript directories.

pub mod config;
pub mod debounce;
pub mod scheduler;
pub mod watcher;

use agentlog_core::SessionStore;
use agentlog_parsers::discover::dirs_home;
use agentlog_parsers::Importer;
use agentlog_runtime_config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::info;

pub use debounce::Debounce;
pub use scheduler::{run_scheduler, Scheduler};

/// Import everything once, then watch the configured sources until
/// `shutdown` flips to true.
pub async fn run(
    cfg: AppConfig,
    store: Arc<dyn SessionStore>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let sources = config::resolve_sources(&cfg, &dirs_home());
    let importer = Arc::new(Importer::with_default_adapters());

    let initial = {
        let importer = Arc::clone(&importer);
        let store = Arc::clone(&store);
        let sources = sources.clone();
        tokio::task::spawn_blocking(move || importer.import_all(&sources, store.as_ref())).await?
    };
    let total: usize = initial.values().sum();
    info!("Initial import stored {total} new session(s)");

    let watch_dirs = config::watch_dirs(&sources);
    if watch_dirs.is_empty() {
        info!("No session directories exist yet. Waiting for them to appear.");
    } else {
        info!("Watching {} directories", watch_dirs.len());
    }
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = watcher::start_watcher(&watch_dirs, tx)?;

    let scheduler = Scheduler::new(sources, cfg.watcher.debounce());
    run_scheduler(
        scheduler,
        watcher,
        importer,
        store,
        cfg.watcher.tick(),
        rx,
        shutdown,
    )
    .await;
    Ok(())
}

/// Wait for SIGTERM or SIGINT
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register Ctrl+C handler");
        info!("Received Ctrl+C");
    }
}
