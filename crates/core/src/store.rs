use crate::model::{Message, Session};

/// Storage failure reported by a [`SessionStore`] backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Upsert-style storage consumed by the import pipeline.
pub trait SessionStore: Send + Sync {
    fn session_exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Insert a new session, or refresh `message_count`, `ended_at` and
    /// `summary` of an existing one.
    fn upsert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Insert all messages of one session as a single batch.
    fn insert_messages(&self, session_id: &str, messages: &[Message]) -> Result<(), StoreError>;

    /// Drop a session together with its messages. Unknown ids are a no-op.
    fn remove_session(&self, id: &str) -> Result<(), StoreError>;

    /// Store a freshly parsed session and its messages as one unit.
    ///
    /// Either both land or neither does: a failed message batch removes the
    /// session row again, so the next import run retries the file instead of
    /// skipping it as known. Backends with transactions override this.
    fn import_session(&self, session: &Session, messages: &[Message]) -> Result<(), StoreError> {
        self.upsert_session(session)?;
        if let Err(e) = self.insert_messages(&session.id, messages) {
            self.remove_session(&session.id)?;
            return Err(e);
        }
        Ok(())
    }
}
