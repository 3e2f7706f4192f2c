use agentlog_daemon::config::resolve_sources;
use agentlog_parsers::discover::dirs_home;
use agentlog_runtime_config::{config_path, AppConfig};
use anyhow::{Context, Result};
use std::path::Path;

/// Show the config file location, its effective contents and the resolved paths.
pub fn show_config(cfg: &AppConfig, db_override: Option<&Path>) -> Result<()> {
    let path = config_path()?;
    let state = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config file: {}{}", path.display(), state);

    let db_path = match db_override {
        Some(p) => p.to_path_buf(),
        None => cfg.db_path()?,
    };
    println!("Database:    {}", db_path.display());
    println!();

    for source in resolve_sources(cfg, &dirs_home()) {
        let status = if source.enabled { "enabled" } else { "disabled" };
        println!("[{}] {} {}", source.tool, status, source.path.display());
    }
    println!();

    let rendered = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    print!("{rendered}");
    Ok(())
}
