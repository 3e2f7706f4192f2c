use agentlog_daemon::config::resolve_sources;
use agentlog_local_db::LocalDb;
use agentlog_parsers::discover::dirs_home;
use agentlog_parsers::Importer;
use agentlog_runtime_config::AppConfig;
use anyhow::{bail, Result};

use crate::output::parse_tool;

/// Import new sessions from every enabled source, or from one tool.
pub fn run_import(cfg: &AppConfig, db: &LocalDb, tool: Option<&str>) -> Result<()> {
    let mut sources = resolve_sources(cfg, &dirs_home());
    if let Some(name) = tool {
        let tool = parse_tool(name)?;
        sources.retain(|s| s.tool == tool.as_str());
        if sources.iter().all(|s| !s.enabled) {
            bail!("Source {tool} is disabled in config");
        }
    }

    let importer = Importer::with_default_adapters();
    let counts = importer.import_all(&sources, db);

    if counts.is_empty() {
        println!("No sources enabled.");
        return Ok(());
    }

    let mut total = 0usize;
    for source in sources.iter().filter(|s| s.enabled) {
        let count = counts.get(&source.tool).copied().unwrap_or(0);
        total += count;
        let note = if source.path.is_dir() { "" } else { " (not found)" };
        println!(
            "[{}] {} new session(s) from {}{}",
            source.tool,
            count,
            source.path.display(),
            note
        );
    }
    println!("Total: {total} new session(s)");
    Ok(())
}
