//! Recall - what happened involving a given character, location or quest.

use campaign_model::{
    sort_chronologically, CharacterId, Event, EventId, LocationId, QuestId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// What a recall is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallBy {
    Character,
    Location,
    Quest,
}

/// A recalled event, trimmed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallHit {
    pub id: EventId,
    pub title: String,
    pub ts: Timestamp,
    /// The event summary, or empty.
    pub excerpt: String,
    pub quest_ids: Vec<QuestId>,
    pub location: Option<LocationId>,
    pub characters: Vec<CharacterId>,
}

impl From<&Event> for RecallHit {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            title: e.title.clone(),
            ts: e.ts,
            excerpt: e.summary.clone().unwrap_or_default(),
            quest_ids: e.quest_ids.clone(),
            location: e.location.clone(),
            characters: e.characters.clone(),
        }
    }
}

/// Events referencing `id` as the given kind, optionally narrowed by a
/// keyword found in the title or summary. Oldest first.
pub fn recall<'a, I>(events: I, by: RecallBy, id: &str, keyword: Option<&str>) -> Vec<RecallHit>
where
    I: IntoIterator<Item = &'a Event>,
{
    let keyword = keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);

    let mut hits: Vec<&Event> = events
        .into_iter()
        .filter(|e| match by {
            RecallBy::Character => e.involves_character(id),
            RecallBy::Location => e.occurs_at(id),
            RecallBy::Quest => e.advances_quest(id),
        })
        .filter(|e| match &keyword {
            Some(k) => {
                e.title.to_lowercase().contains(k)
                    || e.summary.as_deref().is_some_and(|s| s.to_lowercase().contains(k))
            }
            None => true,
        })
        .collect();

    sort_chronologically(&mut hits);
    hits.into_iter().map(RecallHit::from).collect()
}
