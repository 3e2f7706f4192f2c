mod config_cmd;
mod import_cmd;
mod output;
mod sessions_cmd;
mod show_cmd;
mod watch_cmd;

use agentlog_local_db::LocalDb;
use agentlog_runtime_config::AppConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentlog", about = "Import and browse local AI assistant transcripts")]
struct Cli {
    /// Use this database file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import new sessions from every enabled source
    Import {
        /// Only import this tool (claude, codex, gemini)
        #[arg(long)]
        tool: Option<String>,
    },

    /// List imported sessions, newest first
    Sessions {
        #[arg(long)]
        tool: Option<String>,
    },

    /// Print one session with its messages (secrets masked)
    Show {
        id: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Do not mask secrets
        #[arg(long)]
        raw: bool,
    },

    /// Import, then keep watching source directories until interrupted
    Watch,

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let cfg = agentlog_runtime_config::load_config()?;
    match cli.command {
        Commands::Config => config_cmd::show_config(&cfg, cli.db.as_deref()),
        Commands::Import { tool } => {
            let db = open_db(&cfg, cli.db)?;
            import_cmd::run_import(&cfg, &db, tool.as_deref())
        }
        Commands::Sessions { tool } => {
            let db = open_db(&cfg, cli.db)?;
            sessions_cmd::run_sessions(&db, tool.as_deref())
        }
        Commands::Show { id, json, raw } => {
            let db = open_db(&cfg, cli.db)?;
            show_cmd::run_show(&db, &id, json, raw)
        }
        Commands::Watch => {
            let db = open_db(&cfg, cli.db)?;
            watch_cmd::run_watch(cfg, db).await
        }
    }
}

fn open_db(cfg: &AppConfig, override_path: Option<PathBuf>) -> Result<LocalDb> {
    let path = match override_path {
        Some(path) => path,
        None => cfg.db_path()?,
    };
    LocalDb::open_path(&path).with_context(|| format!("Failed to open database {}", path.display()))
}
