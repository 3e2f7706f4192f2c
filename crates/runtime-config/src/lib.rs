//! Shared CLI/watcher configuration types.
//!
//! Both the `agentlog` binary and `agentlog-daemon` read `agentlog.toml`
//! through these types. Watch-directory resolution lives in the daemon crate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "agentlog.toml";

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "agentlog.db";

const APP_DIR_NAME: &str = "agentlog";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration (persisted as `agentlog.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesSettings,
    #[serde(default)]
    pub watcher: WatcherSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl AppConfig {
    /// Database location: the configured path (tilde-expanded) or the default.
    pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
        match self.database.path.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(expand_path(path)),
            _ => default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourcesSettings {
    #[serde(default)]
    pub claude: SourceSettings,
    #[serde(default)]
    pub codex: SourceSettings,
    #[serde(default)]
    pub gemini: SourceSettings,
}

impl SourcesSettings {
    pub fn get(&self, tool: &str) -> Option<&SourceSettings> {
        match tool {
            "claude" => Some(&self.claude),
            "codex" => Some(&self.codex),
            "gemini" => Some(&self.gemini),
            _ => None,
        }
    }

    /// `(tool name, settings)` for every known source, in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SourceSettings)> {
        [
            ("claude", &self.claude),
            ("codex", &self.codex),
            ("gemini", &self.gemini),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Overrides the tool's default directory. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl SourceSettings {
    pub fn resolve_path(&self, default: PathBuf) -> PathBuf {
        match self.path.as_deref() {
            Some(path) if !path.trim().is_empty() => expand_path(path),
            _ => default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatcherSettings {
    /// Quiet period after the last change before a tool is re-imported.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl WatcherSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    1500
}
fn default_tick_ms() -> u64 {
    250
}

// ── Locations ───────────────────────────────────────────────────────────

/// `~/.config/agentlog`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dirs = directories::BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(dirs.home_dir().join(".config").join(APP_DIR_NAME))
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// `<platform data dir>/agentlog/agentlog.db`
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(dirs.data_dir().join(APP_DIR_NAME).join(DB_FILE_NAME))
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the default location; defaults when the file is absent.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
