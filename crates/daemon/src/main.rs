use agentlog_local_db::LocalDb;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentlog_daemon=info".parse().unwrap())
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("Watcher fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    info!("agentlog-daemon starting");

    let cfg = agentlog_runtime_config::load_config()?;
    let db = Arc::new(LocalDb::open_path(&cfg.db_path()?)?);
    info!("Local DB opened");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(agentlog_daemon::run(cfg, db, shutdown_rx));

    agentlog_daemon::wait_for_shutdown().await;
    info!("Shutdown signal received, stopping...");
    let _ = shutdown_tx.send(true);

    handle.await??;
    info!("agentlog-daemon stopped");
    Ok(())
}
