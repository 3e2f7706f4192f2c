//! Codex CLI rollouts: `~/.codex/sessions/YYYY/MM/DD/rollout-<...>-<id>.jsonl`.
//!
//! Every line is `{"timestamp", "type", "payload"}`. `session_meta` carries
//! the working directory; conversation turns are `response_item` payloads
//! with a `role` and a list of content parts.

use crate::common::{
    file_stem, glob_files, join_text_parts, non_empty, set_first, str_field, TimeSpan,
};
use crate::SessionAdapter;
use agentlog_core::records::read_jsonl_file;
use agentlog_core::{truncate_summary, ImportedSession, Message, MessageType, Session, Tool};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Injected context turn that precedes the real first prompt.
const ENVIRONMENT_CONTEXT_MARKER: &str = "<environment_context>";

const UNKNOWN_PROJECT: &str = "unknown";

pub struct CodexAdapter;

impl SessionAdapter for CodexAdapter {
    fn name(&self) -> &str {
        "codex"
    }

    fn tool(&self) -> Tool {
        Tool::Codex
    }

    fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        glob_files(dir, "**/*.jsonl")
    }

    fn session_id_for(&self, path: &Path) -> Option<String> {
        session_id_from_path(path)
    }

    fn parse(&self, path: &Path) -> Result<Option<ImportedSession>> {
        parse_codex_jsonl(path)
    }
}

/// `rollout-label-abc123.jsonl` → `abc123` (everything after the last `-`).
fn session_id_from_path(path: &Path) -> Option<String> {
    let stem = file_stem(path)?;
    let id = stem.rsplit('-').next().unwrap_or(&stem);
    non_empty(id)
}

/// Last segment of a working directory, tolerant of trailing separators and
/// Windows paths.
fn project_from_cwd(cwd: &str) -> Option<String> {
    cwd.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .and_then(non_empty)
}

fn parse_codex_jsonl(path: &Path) -> Result<Option<ImportedSession>> {
    let session_id = session_id_from_path(path)
        .with_context(|| format!("No session id in file name: {}", path.display()))?;
    let parsed = read_jsonl_file(path);
    if parsed.is_empty() {
        return Ok(None);
    }

    let mut span = TimeSpan::default();
    let mut cwd: Option<String> = None;
    let mut summary: Option<String> = None;
    let mut messages = Vec::new();

    for (position, record) in parsed.records.iter().enumerate() {
        let timestamp = str_field(record, "timestamp");
        span.observe(timestamp);
        let Some(payload) = record.get("payload") else {
            continue;
        };

        match str_field(record, "type") {
            Some("session_meta") => {
                set_first(&mut cwd, str_field(payload, "cwd").and_then(non_empty));
            }
            Some("response_item") => {
                let kind = match str_field(payload, "role") {
                    Some("user") => MessageType::User,
                    Some("assistant") => MessageType::Assistant,
                    _ => continue,
                };

                let mut msg = Message::new(&session_id, kind, position);
                if let Some(id) = str_field(payload, "id") {
                    msg.id = id.to_string();
                }
                msg.timestamp = timestamp.map(String::from);
                msg.content = extract_content(payload.get("content"));

                if kind == MessageType::User && summary.is_none() {
                    summary = msg
                        .content
                        .as_deref()
                        .filter(|text| !text.trim_start().starts_with(ENVIRONMENT_CONTEXT_MARKER))
                        .map(truncate_summary);
                }
                messages.push(msg);
            }
            _ => {}
        }
    }

    if messages.is_empty() {
        return Ok(None);
    }

    let mut session = Session::new(&session_id, Tool::Codex);
    session.project = Some(
        cwd.as_deref()
            .and_then(project_from_cwd)
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string()),
    );
    session.project_path = cwd;
    session.summary = summary;
    session.source_path = Some(path.display().to_string());
    span.apply(&mut session);

    Ok(Some(ImportedSession::new(session, messages)))
}

fn extract_content(content: Option<&Value>) -> Option<String> {
    match content? {
        Value::Array(parts) => join_text_parts(parts, &["text", "output_text"]),
        Value::String(text) => non_empty(text),
        _ => None,
    }
}
