mod schema;

use agentlog_core::{Message, MessageType, Session, SessionStore, StoreError, Tool};
use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub use schema::LOCAL_SCHEMA;

const SESSION_COLUMNS: &str = "id, tool, project, project_path, started_at, ended_at, \
                               message_count, summary, source_path";

const MESSAGE_COLUMNS: &str = "id, session_id, type, content, thinking, timestamp, \
                               tool_name, tool_input, tool_output, position";

/// Local SQLite database shared by the CLI and the watcher.
/// Thread-safe: wraps the connection in a Mutex so it can be shared via `Arc<LocalDb>`.
pub struct LocalDb {
    conn: Mutex<Connection>,
}

impl LocalDb {
    /// Open (or create) the database at the default path
    /// (`<data dir>/agentlog/agentlog.db`).
    pub fn open() -> Result<Self> {
        let path = agentlog_runtime_config::default_db_path()?;
        Self::open_path(&path)
    }

    /// Open (or create) the database at a specific path.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir for {}", path.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(LOCAL_SCHEMA)?;
        debug!("Opened local db at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("local db mutex poisoned")
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Sessions, newest first, optionally restricted to one tool.
    pub fn list_sessions(&self, tool: Option<Tool>) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE (?1 IS NULL OR tool = ?1) \
             ORDER BY started_at DESC, id ASC"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tool.map(|t| t.as_str())], row_to_session)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        let session = self
            .conn()
            .query_row(&sql, params![id], row_to_session)
            .optional()?;
        Ok(session)
    }

    /// Messages of one session in source order.
    pub fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 \
             ORDER BY position ASC, rowid ASC"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![session_id], row_to_message)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Tags applied to one message, alphabetical.
    pub fn message_tags(&self, session_id: &str, message_id: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT tag FROM stars WHERE session_id = ?1 AND message_id = ?2 ORDER BY tag ASC",
        )?;
        let rows = stmt.query_map(params![session_id, message_id], |row| row.get(0))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

const UPSERT_SESSION: &str = "INSERT INTO sessions \
     (id, tool, project, project_path, started_at, ended_at, \
      message_count, summary, source_path, imported_at) \
     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10) \
     ON CONFLICT(id) DO UPDATE SET \
      message_count=excluded.message_count, \
      ended_at=excluded.ended_at, \
      summary=excluded.summary";

const INSERT_MESSAGE: &str = "INSERT OR IGNORE INTO messages \
     (id, session_id, type, content, thinking, timestamp, \
      tool_name, tool_input, tool_output, position) \
     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)";

impl SessionStore for LocalDb {
    fn session_exists(&self, id: &str) -> Result<bool, StoreError> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) > 0 FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(StoreError::backend)
    }

    fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        write_session(&self.conn(), session).map_err(StoreError::backend)
    }

    fn insert_messages(&self, session_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(StoreError::backend)?;

        let known: bool = tx
            .query_row(
                "SELECT COUNT(*) > 0 FROM sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(StoreError::backend)?;
        if !known {
            return Err(StoreError::UnknownSession(session_id.to_string()));
        }

        write_messages(&tx, session_id, messages).map_err(StoreError::backend)?;
        tx.commit().map_err(StoreError::backend)
    }

    fn remove_session(&self, id: &str) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])
            .map_err(StoreError::backend)?;
        Ok(())
    }

    /// Session row and messages share one transaction; a failure leaves
    /// nothing behind.
    fn import_session(&self, session: &Session, messages: &[Message]) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(StoreError::backend)?;
        write_session(&tx, session).map_err(StoreError::backend)?;
        write_messages(&tx, &session.id, messages).map_err(StoreError::backend)?;
        tx.commit().map_err(StoreError::backend)
    }
}

fn write_session(conn: &Connection, session: &Session) -> rusqlite::Result<()> {
    let imported_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        UPSERT_SESSION,
        params![
            &session.id,
            session.tool.as_str(),
            &session.project,
            &session.project_path,
            &session.started_at,
            &session.ended_at,
            session.message_count,
            &session.summary,
            &session.source_path,
            &imported_at,
        ],
    )?;
    Ok(())
}

fn write_messages(conn: &Connection, session_id: &str, messages: &[Message]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(INSERT_MESSAGE)?;
    for msg in messages {
        stmt.execute(params![
            &msg.id,
            session_id,
            msg.kind.as_str(),
            &msg.content,
            &msg.thinking,
            &msg.timestamp,
            &msg.tool_name,
            &msg.tool_input,
            &msg.tool_output,
            msg.position,
        ])?;
    }
    Ok(())
}

fn parse_text_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
    let tool: Tool = parse_text_column(1, row.get(1)?)?;
    let mut session = Session::new(row.get::<_, String>(0)?, tool);
    session.project = row.get(2)?;
    session.project_path = row.get(3)?;
    session.started_at = row.get(4)?;
    session.ended_at = row.get(5)?;
    session.message_count = row.get(6)?;
    session.summary = row.get(7)?;
    session.source_path = row.get(8)?;
    Ok(session)
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    let kind: MessageType = parse_text_column(2, row.get(2)?)?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        kind,
        content: row.get(3)?,
        thinking: row.get(4)?,
        timestamp: row.get(5)?,
        tool_name: row.get(6)?,
        tool_input: row.get(7)?,
        tool_output: row.get(8)?,
        position: row.get(9)?,
    })
}
