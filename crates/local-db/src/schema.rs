/// Local schema. Idempotent; applied on every open.
pub const LOCAL_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id            TEXT PRIMARY KEY,
    tool          TEXT NOT NULL,
    project       TEXT,
    project_path  TEXT,
    started_at    TEXT,
    ended_at      TEXT,
    message_count INTEGER NOT NULL DEFAULT 0,
    summary       TEXT,
    source_path   TEXT,
    imported_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_tool ON sessions(tool);
CREATE INDEX IF NOT EXISTS idx_sessions_started ON sessions(started_at);

CREATE TABLE IF NOT EXISTS messages (
    id          TEXT NOT NULL,
    session_id  TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    type        TEXT NOT NULL,
    content     TEXT,
    thinking    TEXT,
    timestamp   TEXT,
    tool_name   TEXT,
    tool_input  TEXT,
    tool_output TEXT,
    position    INTEGER NOT NULL,
    UNIQUE(session_id, id)
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, position);

CREATE TABLE IF NOT EXISTS stars (
    session_id TEXT NOT NULL,
    message_id TEXT NOT NULL,
    tag        TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(session_id, message_id, tag),
    FOREIGN KEY(session_id, message_id) REFERENCES messages(session_id, id) ON DELETE CASCADE
);
";
