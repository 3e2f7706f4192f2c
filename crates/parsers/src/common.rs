//! Helpers shared by the format adapters.

use agentlog_core::Session;
use serde_json::Value;
use std::path::{Path, PathBuf};

// ── First-wins metadata helper ──────────────────────────────────────────────

/// Assign `source` to `target` if `target` is still `None` (first-wins semantics).
pub fn set_first<T>(target: &mut Option<T>, source: Option<T>) {
    if target.is_none() {
        *target = source;
    }
}

// ── Timestamps ──────────────────────────────────────────────────────────────

/// First and last timestamp seen, in encounter order.
#[derive(Debug, Default)]
pub struct TimeSpan {
    first: Option<String>,
    last: Option<String>,
}

impl TimeSpan {
    pub fn observe(&mut self, ts: Option<&str>) {
        let Some(ts) = ts.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        set_first(&mut self.first, Some(ts.to_string()));
        self.last = Some(ts.to_string());
    }

    pub fn apply(self, session: &mut Session) {
        session.started_at = self.first;
        session.ended_at = self.last;
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

// ── JSON field access ───────────────────────────────────────────────────────

pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// `None` for empty or whitespace-only text.
pub fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Newline-join the first present string field (from `keys`) of every part.
pub fn join_text_parts<'a>(parts: impl IntoIterator<Item = &'a Value>, keys: &[&str]) -> Option<String> {
    let texts: Vec<&str> = parts
        .into_iter()
        .filter_map(|part| keys.iter().find_map(|key| str_field(part, key)))
        .collect();
    if texts.is_empty() {
        return None;
    }
    non_empty(&texts.join("\n"))
}

// ── Paths ───────────────────────────────────────────────────────────────────

pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
}

/// Files matching `pattern` below `dir`, sorted.
pub fn glob_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let pattern = format!("{}/{}", dir.display(), pattern);
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(Result::ok).filter(|p| p.is_file()).collect())
        .unwrap_or_default();
    paths.sort();
    paths
}
