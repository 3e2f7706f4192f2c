use agentlog_core::Tool;
use agentlog_parsers::discover::default_source_dir;
use agentlog_parsers::SourceDir;
use agentlog_runtime_config::AppConfig;
use std::path::{Path, PathBuf};

/// One source per known tool: configured path or the tool's default under `home`.
pub fn resolve_sources(config: &AppConfig, home: &Path) -> Vec<SourceDir> {
    Tool::ALL
        .iter()
        .map(|&tool| {
            let default = default_source_dir(home, tool);
            match config.sources.get(tool.as_str()) {
                Some(settings) => SourceDir {
                    tool: tool.as_str().to_string(),
                    path: settings.resolve_path(default),
                    enabled: settings.enabled,
                },
                None => SourceDir::new(tool.as_str(), default),
            }
        })
        .collect()
}

/// Enabled source directories that exist right now.
pub fn watch_dirs(sources: &[SourceDir]) -> Vec<PathBuf> {
    sources
        .iter()
        .filter(|s| s.enabled && s.path.is_dir())
        .map(|s| s.path.clone())
        .collect()
}
