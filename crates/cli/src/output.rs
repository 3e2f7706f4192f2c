use agentlog_core::Tool;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};

pub fn parse_tool(name: &str) -> Result<Tool> {
    name.parse::<Tool>().map_err(|e| anyhow!("{e} (expected one of: claude, codex, gemini)"))
}

/// RFC 3339 timestamps in local time, anything else verbatim, `-` for none.
pub fn format_time(ts: Option<&str>) -> String {
    match ts {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| ts.to_string()),
        None => "-".to_string(),
    }
}

/// First line of `text`, cut to `max` characters.
pub fn one_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
