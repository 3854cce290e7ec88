//! Event definitions - the timestamped records of what happened at the table.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::{CharacterId, EventId, LocationId, QuestId, Timestamp};

/// Fixed marker carried by every event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EventKind {
    #[default]
    #[serde(rename = "EVENT")]
    Event,
}

/// A campaign occurrence with optional links to characters, a location and quests.
///
/// Events are immutable once recorded; the builder methods exist for
/// constructing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,

    #[serde(rename = "type", default)]
    pub kind: EventKind,

    pub title: String,

    /// Epoch milliseconds.
    pub ts: Timestamp,

    /// Participants in order of mention. May be empty.
    #[serde(default)]
    pub characters: Vec<CharacterId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quest_ids: Vec<QuestId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Event {
    /// Create a new event with no references.
    pub fn new(id: impl Into<EventId>, title: impl Into<String>, ts: Timestamp) -> Self {
        Self {
            id: id.into(),
            kind: EventKind::Event,
            title: title.into(),
            ts,
            characters: Vec::new(),
            location: None,
            quest_ids: Vec::new(),
            summary: None,
        }
    }

    /// Add a participant.
    pub fn with_character(mut self, id: impl Into<CharacterId>) -> Self {
        self.characters.push(id.into());
        self
    }

    /// Add several participants.
    pub fn with_characters<I, C>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CharacterId>,
    {
        self.characters.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn at(mut self, location: impl Into<LocationId>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add a quest this event advances.
    pub fn advancing(mut self, quest: impl Into<QuestId>) -> Self {
        self.quest_ids.push(quest.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn involves_character(&self, id: &str) -> bool {
        self.characters.iter().any(|c| c.as_str() == id)
    }

    pub fn occurs_at(&self, id: &str) -> bool {
        self.location.as_ref().is_some_and(|l| l.as_str() == id)
    }

    pub fn advances_quest(&self, id: &str) -> bool {
        self.quest_ids.iter().any(|q| q.as_str() == id)
    }
}

/// Sort events ascending by timestamp, keeping insertion order for ties.
/// Works on owned events and on borrowed ones.
pub fn sort_chronologically<E: Borrow<Event>>(events: &mut [E]) {
    events.sort_by_key(|e| e.borrow().ts);
}
