//! Edge definitions - relationships derived from event references.

use campaign_model::{Event, EventId};
use serde::{Deserialize, Serialize};

use super::{NodeKind, NodeRef};

/// Stable identifier of a derived edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kinds of relationship between an event and what it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    /// Event -> character.
    Participates,
    /// Event -> location.
    OccursAt,
    /// Event -> quest.
    AdvancesQuest,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::Participates, Relation::OccursAt, Relation::AdvancesQuest];

    /// The node kind an edge of this relation points at.
    pub fn target_kind(&self) -> NodeKind {
        match self {
            Relation::Participates => NodeKind::Character,
            Relation::OccursAt => NodeKind::Location,
            Relation::AdvancesQuest => NodeKind::Quest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Participates => "PARTICIPATES",
            Relation::OccursAt => "OCCURS_AT",
            Relation::AdvancesQuest => "ADVANCES_QUEST",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Relation::Participates => "par",
            Relation::OccursAt => "occ",
            Relation::AdvancesQuest => "adv",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge from an event to a referenced entity.
///
/// Edges have no identity of their own; the id is a composite of relation,
/// event, and per-event position so that rebuilt graphs produce the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub relation: Relation,
    pub from: EventId,
    pub to: String,
    /// Ordinal among the event's references of this relation.
    pub position: usize,
}

impl Edge {
    pub fn new(relation: Relation, from: &EventId, to: impl Into<String>, position: usize) -> Self {
        let id = match relation {
            Relation::OccursAt => format!("{}-{}", relation.id_prefix(), from),
            _ => format!("{}-{}-{}", relation.id_prefix(), from, position),
        };
        Self {
            id: EdgeId(id),
            relation,
            from: from.clone(),
            to: to.into(),
            position,
        }
    }

    /// The event end of the edge.
    pub fn source(&self) -> NodeRef {
        NodeRef::new(NodeKind::Event, self.from.as_str())
    }

    /// The referenced entity end of the edge.
    pub fn target(&self) -> NodeRef {
        NodeRef::new(self.relation.target_kind(), self.to.as_str())
    }

    pub fn touches(&self, node: &NodeRef) -> bool {
        self.source() == *node || self.target() == *node
    }
}

/// Edges implied by a single event.
///
/// Order: the location edge, then quests, then participants, each in the
/// order the event lists them.
pub fn edges_for(event: &Event) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(
        usize::from(event.location.is_some()) + event.quest_ids.len() + event.characters.len(),
    );

    if let Some(location) = &event.location {
        edges.push(Edge::new(Relation::OccursAt, &event.id, location.as_str(), 0));
    }
    for (j, quest) in event.quest_ids.iter().enumerate() {
        edges.push(Edge::new(Relation::AdvancesQuest, &event.id, quest.as_str(), j));
    }
    for (j, character) in event.characters.iter().enumerate() {
        edges.push(Edge::new(Relation::Participates, &event.id, character.as_str(), j));
    }

    edges
}
