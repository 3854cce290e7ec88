//! Session directory - session records, the active-session pointer and
//! per-session event archives on top of a key-value store.

use campaign_model::{Event, Session, SessionId, Timestamp};
use serde::Serialize;

use super::{read_json, write_json, KeyValueStore};

/// List/get/create/end operations over persisted sessions.
///
/// Write failures are logged and otherwise ignored so that the live session
/// keeps running even when storage is unavailable.
#[derive(Debug, Clone)]
pub struct SessionDirectory<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> SessionDirectory<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn sessions_key(&self) -> String {
        format!("{}sessions", self.prefix)
    }

    fn active_key(&self) -> String {
        format!("{}activeSessionId", self.prefix)
    }

    fn archive_key(&self, id: &SessionId) -> String {
        format!("{}archive_{}", self.prefix, id)
    }

    /// All sessions in creation order.
    pub fn list(&self) -> Vec<Session> {
        read_json(&self.store, &self.sessions_key())
    }

    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.list().into_iter().find(|s| s.id == *id)
    }

    /// The session the active pointer refers to, if it has not ended.
    pub fn active(&self) -> Option<Session> {
        let id = self.store.get(&self.active_key())?;
        self.list()
            .into_iter()
            .find(|s| s.id.as_str() == id && s.is_active())
    }

    /// Record a new session and mark it active.
    pub fn create(&mut self, title: Option<String>, started_at: Timestamp) -> Session {
        let session = Session::start(SessionId::generate(), title, started_at);

        let mut sessions = self.list();
        sessions.push(session.clone());
        self.persist(&self.sessions_key(), &sessions);

        let key = self.active_key();
        if let Err(e) = self.store.set(&key, session.id.as_str()) {
            tracing::warn!(session = %session.id, "failed to store active session pointer: {e}");
        }

        session
    }

    /// Mark a session ended and clear the active pointer if it pointed here.
    ///
    /// The end time is written once; ending again keeps the original.
    /// Returns `None` for an unknown session.
    pub fn end(&mut self, id: &SessionId, at: Timestamp) -> Option<Session> {
        let mut sessions = self.list();
        let index = sessions.iter().position(|s| s.id == *id);

        if let Some(i) = index {
            if sessions[i].end(at) {
                self.persist(&self.sessions_key(), &sessions);
            }
        }

        let key = self.active_key();
        if self.store.get(&key).as_deref() == Some(id.as_str()) {
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!(session = %id, "failed to clear active session pointer: {e}");
            }
        }

        index.map(|i| sessions.swap_remove(i))
    }

    /// Save the events recorded during a session.
    pub fn write_archive(&mut self, id: &SessionId, events: &[Event]) {
        self.persist(&self.archive_key(id), events);
    }

    /// Events archived for a session; empty when missing or unreadable.
    pub fn archive(&self, id: &SessionId) -> Vec<Event> {
        read_json(&self.store, &self.archive_key(id))
    }

    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = write_json(&mut self.store, key, value) {
            tracing::warn!(key, "failed to persist value: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn directory() -> SessionDirectory<MemoryStore> {
        SessionDirectory::new(MemoryStore::new(), "ds_")
    }

    #[test]
    fn test_create_marks_active() {
        let mut dir = directory();
        let session = dir.create(Some("Intro".into()), 1_000);

        assert_eq!(dir.list().len(), 1);
        assert_eq!(dir.active().unwrap().id, session.id);
        assert_eq!(dir.get(&session.id).unwrap().title.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut dir = directory();
        let session = dir.create(None, 1_000);

        let ended = dir.end(&session.id, 2_000).unwrap();
        assert_eq!(ended.ended_at, Some(2_000));
        assert!(dir.active().is_none());

        let again = dir.end(&session.id, 3_000).unwrap();
        assert_eq!(again.ended_at, Some(2_000));
        assert_eq!(dir.get(&session.id).unwrap().ended_at, Some(2_000));
    }

    #[test]
    fn test_end_unknown_session() {
        let mut dir = directory();
        let session = dir.create(None, 1_000);

        assert!(dir.end(&SessionId::new("nope"), 2_000).is_none());
        // The real active session is untouched.
        assert_eq!(dir.active().unwrap().id, session.id);
    }

    #[test]
    fn test_archive_roundtrip_and_corruption() {
        let mut dir = directory();
        let id = SessionId::new("sess-1");
        assert!(dir.archive(&id).is_empty());

        dir.write_archive(&id, &[Event::new("e1", "Broken Seal", 10)]);
        assert_eq!(dir.archive(&id).len(), 1);

        dir.store_mut().set("ds_archive_sess-1", "garbage").unwrap();
        assert!(dir.archive(&id).is_empty());
    }

    #[test]
    fn test_corrupt_session_list_reads_empty() {
        let mut store = MemoryStore::new();
        store.set("ds_sessions", "[{]").unwrap();
        store.set("ds_activeSessionId", "sess-x").unwrap();
        let dir = SessionDirectory::new(store, "ds_");

        assert!(dir.list().is_empty());
        assert!(dir.active().is_none());
    }
}
