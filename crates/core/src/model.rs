use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum summary length in characters (before the ellipsis marker).
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Source assistant a session was imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Claude,
    Codex,
    Gemini,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Claude, Tool::Codex, Tool::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "claude-code" => Ok(Self::Claude),
            "codex" => Ok(Self::Codex),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

/// One imported conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Stable id derived from the file name or an embedded session id.
    pub id: String,
    pub tool: Tool,
    pub project: Option<String>,
    pub project_path: Option<String>,
    /// ISO-8601 timestamp of the first timestamped record.
    pub started_at: Option<String>,
    /// ISO-8601 timestamp of the last timestamped record.
    pub ended_at: Option<String>,
    pub message_count: i64,
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>, tool: Tool) -> Self {
        Self {
            id: id.into(),
            tool,
            project: None,
            project_path: None,
            started_at: None,
            ended_at: None,
            message_count: 0,
            summary: None,
            source_path: None,
        }
    }
}

/// Conversation role of a normalized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown message type: {other}")),
        }
    }
}

/// One normalized user or assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: Option<String>,
    pub thinking: Option<String>,
    pub timestamp: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<String>,
    pub tool_output: Option<String>,
    /// Index of the raw record inside the source file. Not renumbered after
    /// non-message records are dropped, so gaps are expected.
    pub position: i64,
}

impl Message {
    pub fn new(session_id: &str, kind: MessageType, position: usize) -> Self {
        Self {
            id: fallback_message_id(session_id, position),
            session_id: session_id.to_string(),
            kind,
            content: None,
            thinking: None,
            timestamp: None,
            tool_name: None,
            tool_input: None,
            tool_output: None,
            position: position as i64,
        }
    }

    /// Copy of this message with secrets masked in every free-text field.
    pub fn masked(&self) -> Self {
        Self {
            content: crate::mask::mask_opt(self.content.as_deref()),
            thinking: crate::mask::mask_opt(self.thinking.as_deref()),
            tool_output: crate::mask::mask_opt(self.tool_output.as_deref()),
            ..self.clone()
        }
    }
}

/// Deterministic id for records that carry no identifier of their own.
pub fn fallback_message_id(session_id: &str, position: usize) -> String {
    format!("{session_id}-{position}")
}

/// Normalized output of one adapter run over one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSession {
    pub session: Session,
    pub messages: Vec<Message>,
}

impl ImportedSession {
    /// Build the result, fixing `message_count` to the messages actually kept.
    pub fn new(mut session: Session, messages: Vec<Message>) -> Self {
        session.message_count = messages.len() as i64;
        Self { session, messages }
    }
}

/// Truncate `text` to [`SUMMARY_MAX_CHARS`] characters, appending `...` when cut.
pub fn truncate_summary(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SUMMARY_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(SUMMARY_MAX_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_roundtrip_names() {
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        }
        assert_eq!("claude-code".parse::<Tool>().unwrap(), Tool::Claude);
        assert!("cursor".parse::<Tool>().is_err());
    }

    #[test]
    fn test_message_serializes_kind_as_type() {
        let msg = Message::new("s1", MessageType::Assistant, 3);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "assistant");
        assert_eq!(json["id"], "s1-3");
        assert_eq!(json["position"], 3);
    }

    #[test]
    fn test_imported_session_counts_kept_messages() {
        let messages = vec![
            Message::new("s1", MessageType::User, 0),
            Message::new("s1", MessageType::Assistant, 4),
        ];
        let imported = ImportedSession::new(Session::new("s1", Tool::Claude), messages);
        assert_eq!(imported.session.message_count, 2);
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(truncate_summary("  short  "), "short");
        let long = "é".repeat(250);
        let cut = truncate_summary(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), SUMMARY_MAX_CHARS + 3);
    }

    #[test]
    fn test_masked_keeps_structure() {
        let mut msg = Message::new("s1", MessageType::User, 0);
        msg.content = Some("export OPENAI_API_KEY=abc123secret".to_string());
        msg.thinking = None;
        let masked = msg.masked();
        assert_eq!(masked.id, msg.id);
        assert!(!masked.content.unwrap().contains("abc123secret"));
        assert_eq!(masked.thinking, None);
    }
}
