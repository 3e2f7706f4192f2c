//! Raw record reading for source transcripts.
//!
//! Two shapes are supported:
//! ```jsonl
//! {"type":"user","message":{...}}
//! {"type":"assistant","message":{...}}
//! ```
//! (one JSON value per line) and a single JSON document per file.
//!
//! Neither reader returns an error: malformed lines are counted and skipped,
//! and an unreadable file becomes an empty result with one error.

use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Failures shown individually before collapsing into an overflow note.
pub const MAX_LOGGED_ERRORS: usize = 3;

/// One record that could not be decoded.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("JSON document error: {0}")]
    Document(serde_json::Error),
}

/// Decoded records in file order plus the number that failed.
#[derive(Debug, Default, Clone)]
pub struct ParsedRecords {
    pub records: Vec<Value>,
    pub errors: usize,
}

impl ParsedRecords {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn failed() -> Self {
        Self {
            records: Vec::new(),
            errors: 1,
        }
    }
}

/// Decode line-delimited JSON. `origin` names the source in log lines.
pub fn parse_jsonl_str(text: &str, origin: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    let mut shown: Vec<RecordError> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => parsed.records.push(value),
            Err(source) => {
                parsed.errors += 1;
                if shown.len() < MAX_LOGGED_ERRORS {
                    let err = RecordError::Json {
                        line: idx + 1,
                        source,
                    };
                    debug!("{origin}: {err}");
                    shown.push(err);
                }
            }
        }
    }

    if parsed.errors > 0 {
        warn_errors(origin, parsed.errors, &shown);
    }
    parsed
}

/// Read a file and decode it as line-delimited JSON.
pub fn read_jsonl_file(path: &Path) -> ParsedRecords {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_jsonl_str(&text, &path.display().to_string()),
        Err(e) => {
            warn!("{}: {}", path.display(), RecordError::Io(e));
            ParsedRecords::failed()
        }
    }
}

/// Decode a whole document as one JSON value.
pub fn parse_json_str(text: &str, origin: &str) -> ParsedRecords {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => ParsedRecords {
            records: vec![value],
            errors: 0,
        },
        Err(e) => {
            warn!("{origin}: {}", RecordError::Document(e));
            ParsedRecords::failed()
        }
    }
}

/// Read a file and decode it as a single JSON document.
pub fn read_json_file(path: &Path) -> ParsedRecords {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_json_str(&text, &path.display().to_string()),
        Err(e) => {
            warn!("{}: {}", path.display(), RecordError::Io(e));
            ParsedRecords::failed()
        }
    }
}

fn warn_errors(origin: &str, total: usize, shown: &[RecordError]) {
    let mut details: Vec<String> = shown.iter().map(ToString::to_string).collect();
    if total > shown.len() {
        details.push(format!("...and {} more errors", total - shown.len()));
    }
    warn!(
        "{origin}: skipped {total} malformed record(s): {}",
        details.join("; ")
    );
}
