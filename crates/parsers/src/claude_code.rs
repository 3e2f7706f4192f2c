//! Claude Code transcripts: `~/.claude/projects/<encoded-project>/<session>.jsonl`.
//!
//! The project directory name is the working directory with `/` replaced by
//! `-`, e.g. `-Users-alice-work-api`. Each line is one event record; only
//! `user`, `assistant` and `summary` records matter here.

use crate::common::{file_stem, glob_files, non_empty, set_first, str_field, TimeSpan};
use crate::SessionAdapter;
use agentlog_core::records::read_jsonl_file;
use agentlog_core::{truncate_summary, ImportedSession, Message, MessageType, Session, Tool};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Leading segments of the encoded directory name that are dropped
/// (the empty root segment, `Users`/`home`, and the user name).
const PROJECT_PREFIX_SEGMENTS: usize = 3;

pub struct ClaudeCodeAdapter;

impl SessionAdapter for ClaudeCodeAdapter {
    fn name(&self) -> &str {
        "claude"
    }

    fn tool(&self) -> Tool {
        Tool::Claude
    }

    fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        glob_files(dir, "*/*.jsonl")
            .into_iter()
            .filter(|p| !is_sidechain_path(p))
            .collect()
    }

    fn session_id_for(&self, path: &Path) -> Option<String> {
        file_stem(path)
    }

    fn parse(&self, path: &Path) -> Result<Option<ImportedSession>> {
        parse_claude_jsonl(path)
    }
}

/// Subagent transcripts (`agent-<id>.jsonl`) duplicate turns of their parent session.
fn is_sidechain_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("agent-"))
}

/// `-Users-alice-work-api` → `work-api`.
pub(crate) fn decode_project_name(dir_name: &str) -> String {
    let segments: Vec<&str> = dir_name.split('-').collect();
    if segments.len() > PROJECT_PREFIX_SEGMENTS {
        segments[PROJECT_PREFIX_SEGMENTS..].join("-")
    } else {
        dir_name.to_string()
    }
}

/// `-Users-alice-work-api` → `/Users/alice/work/api` (lossy for names containing `-`).
fn decode_project_path(dir_name: &str) -> String {
    dir_name.replace('-', "/")
}

fn parse_claude_jsonl(path: &Path) -> Result<Option<ImportedSession>> {
    let session_id = file_stem(path)
        .with_context(|| format!("No session id in file name: {}", path.display()))?;
    let parsed = read_jsonl_file(path);
    if parsed.is_empty() {
        return Ok(None);
    }

    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    let mut span = TimeSpan::default();
    let mut summary: Option<String> = None;
    let mut first_user_text: Option<String> = None;
    let mut cwd: Option<String> = None;
    let mut messages = Vec::new();

    for (position, record) in parsed.records.iter().enumerate() {
        let timestamp = str_field(record, "timestamp");
        span.observe(timestamp);

        let kind = match str_field(record, "type") {
            Some("summary") => {
                if let Some(text) = str_field(record, "summary").and_then(non_empty) {
                    summary = Some(text);
                }
                continue;
            }
            Some("user") => MessageType::User,
            Some("assistant") => MessageType::Assistant,
            _ => continue,
        };
        if record.get("isMeta").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        set_first(&mut cwd, str_field(record, "cwd").map(String::from));

        let (content, thinking) = extract_content(record.get("message").and_then(|m| m.get("content")));

        let mut msg = Message::new(&session_id, kind, position);
        if let Some(uuid) = str_field(record, "uuid") {
            msg.id = uuid.to_string();
        }
        msg.timestamp = timestamp.map(String::from);
        msg.content = content;
        msg.thinking = thinking;

        if kind == MessageType::User {
            set_first(&mut first_user_text, msg.content.clone());
        }
        messages.push(msg);
    }

    if messages.is_empty() {
        return Ok(None);
    }

    let mut session = Session::new(&session_id, Tool::Claude);
    session.project = dir_name.map(decode_project_name);
    session.project_path = cwd.or_else(|| dir_name.map(decode_project_path));
    session.summary = summary.or(first_user_text).map(|s| truncate_summary(&s));
    session.source_path = Some(path.display().to_string());
    span.apply(&mut session);

    Ok(Some(ImportedSession::new(session, messages)))
}

/// Content is either a plain string or a list of typed parts. Text parts are
/// newline-joined; the last `thinking` part becomes the reasoning text.
fn extract_content(content: Option<&Value>) -> (Option<String>, Option<String>) {
    match content {
        Some(Value::String(text)) => (non_empty(text), None),
        Some(Value::Array(parts)) => {
            let mut texts: Vec<&str> = Vec::new();
            let mut thinking: Option<String> = None;
            for part in parts {
                match str_field(part, "type") {
                    Some("text") => {
                        if let Some(text) = str_field(part, "text") {
                            texts.push(text);
                        }
                    }
                    Some("thinking") => {
                        if let Some(text) = str_field(part, "thinking").and_then(non_empty) {
                            thinking = Some(text);
                        }
                    }
                    _ => {}
                }
            }
            (non_empty(&texts.join("\n")), thinking)
        }
        _ => (None, None),
    }
}
