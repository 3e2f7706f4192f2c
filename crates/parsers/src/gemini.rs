//! Gemini CLI sessions: `~/.gemini/tmp/<project_hash>/chats/session-*.json`.
//!
//! One JSON document per session with its own `messages` array, so no line
//! parsing is involved. Message `type` is `user`, `gemini` or `info`.

use crate::common::{file_stem, glob_files, join_text_parts, non_empty, str_field, TimeSpan};
use crate::SessionAdapter;
use agentlog_core::records::read_json_file;
use agentlog_core::{truncate_summary, ImportedSession, Message, MessageType, Session, Tool};
use anyhow::{bail, Result};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const PROJECT_TAG: &str = "gemini:";
const PROJECT_HASH_CHARS: usize = 8;
const DEFAULT_SUMMARY: &str = "Gemini session";

/// `@file` expansions are appended after this marker; the user's actual
/// question is the text before it.
static REFERENCED_FILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{3}\s*Content from referenced files\s*-{3}").unwrap());

pub struct GeminiAdapter;

impl SessionAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    fn tool(&self) -> Tool {
        Tool::Gemini
    }

    fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        glob_files(dir, "*/chats/*.json")
    }

    fn parse(&self, path: &Path) -> Result<Option<ImportedSession>> {
        parse_gemini_json(path)
    }
}

fn parse_gemini_json(path: &Path) -> Result<Option<ImportedSession>> {
    let parsed = read_json_file(path);
    let Some(doc) = parsed.records.into_iter().next() else {
        return Ok(None);
    };
    if !doc.is_object() {
        bail!("Not a Gemini session document: {}", path.display());
    }

    let Some(session_id) = str_field(&doc, "sessionId")
        .and_then(non_empty)
        .or_else(|| file_stem(path))
    else {
        bail!("No session id for {}", path.display());
    };

    let Some(raw_messages) = doc.get("messages").and_then(Value::as_array) else {
        bail!("Missing messages array in {}", path.display());
    };

    let mut span = TimeSpan::default();
    let mut messages = Vec::new();

    for (position, raw) in raw_messages.iter().enumerate() {
        let timestamp = str_field(raw, "timestamp");
        span.observe(timestamp);

        let kind = match str_field(raw, "type") {
            Some("user") => MessageType::User,
            Some("gemini" | "model" | "assistant") => MessageType::Assistant,
            _ => continue,
        };

        let mut msg = Message::new(&session_id, kind, position);
        if let Some(id) = str_field(raw, "id").and_then(non_empty) {
            msg.id = id;
        }
        msg.timestamp = timestamp.map(String::from);
        msg.content = extract_content(raw.get("content"));
        msg.thinking = raw
            .get("thoughts")
            .and_then(Value::as_array)
            .and_then(|thoughts| format_thoughts(thoughts));
        messages.push(msg);
    }

    if messages.is_empty() {
        return Ok(None);
    }

    if span.is_empty() {
        span.observe(str_field(&doc, "startTime"));
        span.observe(str_field(&doc, "lastUpdated"));
    }

    let mut session = Session::new(&session_id, Tool::Gemini);
    if let Some(hash) = str_field(&doc, "projectHash").and_then(non_empty) {
        let short: String = hash.chars().take(PROJECT_HASH_CHARS).collect();
        session.project = Some(format!("{PROJECT_TAG}{short}"));
        session.project_path = Some(hash);
    }
    session.summary = Some(summarize(&messages));
    session.source_path = Some(path.display().to_string());
    span.apply(&mut session);

    Ok(Some(ImportedSession::new(session, messages)))
}

/// Plain string content, or a list of parts carrying `text`.
fn extract_content(content: Option<&Value>) -> Option<String> {
    match content? {
        Value::String(text) => non_empty(text),
        Value::Array(parts) => join_text_parts(parts, &["text"]),
        part @ Value::Object(_) => str_field(part, "text").and_then(non_empty),
        _ => None,
    }
}

/// Each thought renders as `**subject**\ndescription` (or the bare
/// description); thoughts are separated by a blank line.
fn format_thoughts(thoughts: &[Value]) -> Option<String> {
    let blocks: Vec<String> = thoughts
        .iter()
        .filter_map(|thought| {
            let description = str_field(thought, "description").and_then(non_empty)?;
            match str_field(thought, "subject").and_then(non_empty) {
                Some(subject) => Some(format!("**{subject}**\n{description}")),
                None => Some(description),
            }
        })
        .collect();
    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

/// The first user message, without referenced-file expansions. When that
/// message is empty or slash-prefixed (a path or command rather than a
/// question) the session gets the default summary. Later messages are not
/// consulted.
fn summarize(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.kind == MessageType::User)
        .and_then(|m| m.content.as_deref())
        .map(strip_referenced_files)
        .filter(|text| !text.is_empty() && !text.starts_with('/'))
        .map(truncate_summary)
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
}

fn strip_referenced_files(text: &str) -> &str {
    let question = match REFERENCED_FILES_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    question.trim()
}
