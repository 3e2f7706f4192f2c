use crate::{Message, MessageType, Session, SessionStore, StoreError, Tool};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory [`SessionStore`] for tests.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<BTreeMap<String, Session>>,
    messages: Mutex<BTreeMap<String, Vec<Message>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.lock().unwrap().keys().cloned().collect()
    }

    pub fn messages(&self, session_id: &str) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl SessionStore for MemoryStore {
    fn session_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.lock().unwrap().contains_key(id))
    }

    fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                existing.message_count = session.message_count;
                existing.ended_at = session.ended_at.clone();
                existing.summary = session.summary.clone();
            }
            None => {
                sessions.insert(session.id.clone(), session.clone());
            }
        }
        Ok(())
    }

    fn insert_messages(&self, session_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        if !self.sessions.lock().unwrap().contains_key(session_id) {
            return Err(StoreError::UnknownSession(session_id.to_string()));
        }
        self.messages
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    fn remove_session(&self, id: &str) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().remove(id);
        self.messages.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Wraps a [`MemoryStore`] and fails the first `n` message batches.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures_left: Mutex<usize>,
}

impl FlakyStore {
    pub fn failing(n: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures_left: Mutex::new(n),
        }
    }
}

impl SessionStore for FlakyStore {
    fn session_exists(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.session_exists(id)
    }

    fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.inner.upsert_session(session)
    }

    fn insert_messages(&self, session_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return Err(StoreError::backend("disk I/O error"));
        }
        drop(left);
        self.inner.insert_messages(session_id, messages)
    }

    fn remove_session(&self, id: &str) -> Result<(), StoreError> {
        self.inner.remove_session(id)
    }
}

/// Session with a fixed id for the given tool.
pub fn session(id: &str, tool: Tool) -> Session {
    Session::new(id, tool)
}

/// Text message at `position`.
pub fn message(session_id: &str, kind: MessageType, position: usize, text: &str) -> Message {
    let mut msg = Message::new(session_id, kind, position);
    msg.content = Some(text.to_string());
    msg
}
