//! Timeline - filtered, chronological views over recorded events.
//!
//! Everything here is a pure function of the event list it is given. The
//! [`EventSource`] trait is the seam through which views such as the graph
//! view re-query whatever currently holds the events.

mod recall;

pub use recall::*;

use std::collections::HashSet;

use campaign_model::{
    sort_chronologically, CharacterId, Event, LocationId, QuestId, Session, Timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filters for an event query. All filters must match; an empty id set
/// places no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventQuery {
    /// Inclusive lower bound on the timestamp.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on the timestamp.
    pub to: Option<Timestamp>,
    /// Match events involving any of these characters.
    pub character_ids: Vec<CharacterId>,
    /// Match events at any of these locations.
    pub location_ids: Vec<LocationId>,
    /// Match events advancing any of these quests.
    pub quest_ids: Vec<QuestId>,
    /// Case-insensitive free text.
    pub text: Option<String>,
}

impl EventQuery {
    /// A query that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// A free-text query.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn between(mut self, from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_character(mut self, id: impl Into<CharacterId>) -> Self {
        self.character_ids.push(id.into());
        self
    }

    pub fn with_location(mut self, id: impl Into<LocationId>) -> Self {
        self.location_ids.push(id.into());
        self
    }

    pub fn with_quest(mut self, id: impl Into<QuestId>) -> Self {
        self.quest_ids.push(id.into());
        self
    }

    /// The trimmed, lower-cased search text, if any is left.
    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Check whether a single event passes every filter.
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_with(event, self.needle().as_deref())
    }

    fn matches_with(&self, event: &Event, needle: Option<&str>) -> bool {
        if self.from.is_some_and(|from| event.ts < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.ts > to) {
            return false;
        }
        if !self.character_ids.is_empty()
            && !event.characters.iter().any(|c| self.character_ids.contains(c))
        {
            return false;
        }
        if !self.location_ids.is_empty()
            && !event
                .location
                .as_ref()
                .is_some_and(|l| self.location_ids.contains(l))
        {
            return false;
        }
        if !self.quest_ids.is_empty() && !event.quest_ids.iter().any(|q| self.quest_ids.contains(q)) {
            return false;
        }
        match needle {
            Some(needle) => search_text(event).contains(needle),
            None => true,
        }
    }
}

/// Lower-cased text an event is searched by: title, summary, location,
/// participants and quests.
fn search_text(event: &Event) -> String {
    let characters: Vec<&str> = event.characters.iter().map(|c| c.as_str()).collect();
    let quests: Vec<&str> = event.quest_ids.iter().map(|q| q.as_str()).collect();
    format!(
        "{} {} {} {} {}",
        event.title,
        event.summary.as_deref().unwrap_or_default(),
        event.location.as_ref().map(|l| l.as_str()).unwrap_or_default(),
        characters.join(" "),
        quests.join(" "),
    )
    .to_lowercase()
}

/// Run a query over events, returning matches sorted ascending by timestamp.
/// Events with equal timestamps keep their input order.
pub fn query_events<'a, I>(events: I, query: &EventQuery) -> Vec<Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let needle = query.needle();
    let mut matches: Vec<Event> = events
        .into_iter()
        .filter(|e| query.matches_with(e, needle.as_deref()))
        .cloned()
        .collect();
    sort_chronologically(&mut matches);
    matches
}

/// Anything that can answer event queries.
pub trait EventSource {
    /// All events matching `query`, sorted ascending by timestamp.
    fn query_events(&self, query: &EventQuery) -> Vec<Event>;
}

impl EventSource for [Event] {
    fn query_events(&self, query: &EventQuery) -> Vec<Event> {
        query_events(self, query)
    }
}

impl EventSource for Vec<Event> {
    fn query_events(&self, query: &EventQuery) -> Vec<Event> {
        query_events(self, query)
    }
}

/// One row of the combined timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimelineEntry {
    /// Marks where a session began.
    Session(Session),
    Event(Event),
}

impl TimelineEntry {
    pub fn ts(&self) -> Timestamp {
        match self {
            TimelineEntry::Session(s) => s.started_at,
            TimelineEntry::Event(e) => e.ts,
        }
    }
}

/// Merge session markers and events into one chronological stream.
///
/// A session marker sorts before events with the same timestamp.
pub fn timeline_entries(sessions: &[Session], events: &[Event]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = sessions
        .iter()
        .cloned()
        .map(TimelineEntry::Session)
        .chain(events.iter().cloned().map(TimelineEntry::Event))
        .collect();
    entries.sort_by_key(|e| e.ts());
    entries
}

/// Distinct filter choices present in a set of events, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub characters: Vec<CharacterId>,
    pub locations: Vec<LocationId>,
    pub quests: Vec<QuestId>,
}

impl FilterOptions {
    pub fn from_events(events: &[Event]) -> Self {
        let mut options = Self::default();
        let mut seen_c = HashSet::new();
        let mut seen_l = HashSet::new();
        let mut seen_q = HashSet::new();

        for event in events {
            for c in &event.characters {
                if seen_c.insert(c) {
                    options.characters.push(c.clone());
                }
            }
            if let Some(l) = &event.location {
                if seen_l.insert(l) {
                    options.locations.push(l.clone());
                }
            }
            for q in &event.quest_ids {
                if seen_q.insert(q) {
                    options.quests.push(q.clone());
                }
            }
        }

        options
    }
}

/// Format a timestamp for display, e.g. `2024-05-01 18:30 UTC`.
pub fn format_timestamp(ts: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ts) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => ts.to_string(),
    }
}
