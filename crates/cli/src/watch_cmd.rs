use agentlog_local_db::LocalDb;
use agentlog_runtime_config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Run the watcher in the foreground until Ctrl+C / SIGTERM.
pub async fn run_watch(cfg: AppConfig, db: LocalDb) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut handle = tokio::spawn(agentlog_daemon::run(cfg, Arc::new(db), shutdown_rx));

    eprintln!("Watching for new sessions. Press Ctrl+C to stop.");
    tokio::select! {
        result = &mut handle => return result?,
        _ = agentlog_daemon::wait_for_shutdown() => {}
    }
    let _ = shutdown_tx.send(true);
    handle.await?
}
