pub mod mask;
pub mod model;
pub mod records;
pub mod store;

pub use mask::{mask_opt, mask_secrets};
pub use model::*;
pub use store::{SessionStore, StoreError};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests {
    use super::testing::{message, session, FlakyStore, MemoryStore};
    use super::*;

    #[test]
    fn test_memory_store_refreshes_existing_session() {
        let store = MemoryStore::new();
        let mut s = session("s1", Tool::Codex);
        s.project = Some("proj".to_string());
        s.message_count = 1;
        store.upsert_session(&s).unwrap();

        let mut refreshed = session("s1", Tool::Codex);
        refreshed.message_count = 5;
        refreshed.summary = Some("new".to_string());
        store.upsert_session(&refreshed).unwrap();

        let stored = store.session("s1").unwrap();
        assert_eq!(stored.message_count, 5);
        assert_eq!(stored.summary.as_deref(), Some("new"));
        assert_eq!(stored.project.as_deref(), Some("proj"));
    }

    #[test]
    fn test_memory_store_rejects_orphan_messages() {
        let store = MemoryStore::new();
        let err = store
            .insert_messages("missing", &[message("missing", MessageType::User, 0, "hi")])
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSession(_)));
    }

    #[test]
    fn test_import_session_rolls_back_failed_batch() {
        let store = FlakyStore::failing(1);
        let mut s = session("s1", Tool::Claude);
        s.message_count = 1;
        let msgs = [message("s1", MessageType::User, 0, "hi")];

        assert!(store.import_session(&s, &msgs).is_err());
        assert!(!store.session_exists("s1").unwrap());

        store.import_session(&s, &msgs).unwrap();
        assert_eq!(store.inner.session("s1").unwrap().message_count, 1);
        assert_eq!(store.inner.messages("s1").len(), 1);
    }
}
