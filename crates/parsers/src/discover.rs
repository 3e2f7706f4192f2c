//! Default on-disk locations of each assistant's transcripts.

use crate::SourceDir;
use agentlog_core::Tool;
use std::path::{Path, PathBuf};

/// Source directories for every built-in tool under `home`, all enabled.
pub fn default_sources(home: &Path) -> Vec<SourceDir> {
    Tool::ALL
        .iter()
        .map(|&tool| SourceDir::new(tool.as_str(), default_source_dir(home, tool)))
        .collect()
}

/// Where `tool` writes its sessions. `CODEX_HOME` overrides `~/.codex`.
pub fn default_source_dir(home: &Path, tool: Tool) -> PathBuf {
    match tool {
        Tool::Claude => home.join(".claude").join("projects"),
        Tool::Codex => codex_home(home).join("sessions"),
        Tool::Gemini => home.join(".gemini").join("tmp"),
    }
}

fn codex_home(home: &Path) -> PathBuf {
    match std::env::var("CODEX_HOME") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
        _ => home.join(".codex"),
    }
}

pub fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_cover_all_tools() {
        let home = Path::new("/home/alice");
        let sources = default_sources(home);
        let tools: Vec<&str> = sources.iter().map(|s| s.tool.as_str()).collect();
        assert_eq!(tools, vec!["claude", "codex", "gemini"]);
        assert!(sources.iter().all(|s| s.enabled));
        assert_eq!(sources[0].path, PathBuf::from("/home/alice/.claude/projects"));
        assert_eq!(sources[2].path, PathBuf::from("/home/alice/.gemini/tmp"));
        assert!(sources[1].path.ends_with("sessions"));
    }
}
