//! Event store - campaign history plus the events of the current session.

use campaign_model::Event;

use crate::timeline::{query_events, EventQuery, EventSource};

/// Ordered event collection. Base events are fixed history; the session
/// buffer is append-only while a session is live and cleared when a new one
/// starts.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    base: Vec<Event>,
    session: Vec<Event>,
}

impl EventStore {
    pub fn new(base: Vec<Event>) -> Self {
        Self {
            base,
            session: Vec::new(),
        }
    }

    pub fn base(&self) -> &[Event] {
        &self.base
    }

    /// Events recorded since the current session started.
    pub fn session(&self) -> &[Event] {
        &self.session
    }

    /// Base events followed by session events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.base.iter().chain(self.session.iter())
    }

    /// Owned copy of every event, base first.
    pub fn all(&self) -> Vec<Event> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append(&mut self, event: Event) {
        self.session.push(event);
    }

    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// Timestamp of the newest session event.
    pub fn last_session_ts(&self) -> Option<i64> {
        self.session.last().map(|e| e.ts)
    }
}

impl EventSource for EventStore {
    fn query_events(&self, query: &EventQuery) -> Vec<Event> {
        query_events(self.iter(), query)
    }
}
