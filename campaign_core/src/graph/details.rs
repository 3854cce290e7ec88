//! Details for a selected node or edge, with references resolved to names.

use campaign_model::{sort_chronologically, Character, Event, Location, Quest};

use super::{EdgeId, Graph, NodeKind, NodeRef, Relation};

/// What a details panel shows for a selected node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetails<'a> {
    Event {
        event: &'a Event,
        location: Option<&'a str>,
        characters: Vec<&'a str>,
        quests: Vec<&'a str>,
    },
    Character {
        character: &'a Character,
        /// Events the character took part in, oldest first.
        events: Vec<&'a Event>,
    },
    Location {
        location: &'a Location,
        events: Vec<&'a Event>,
    },
    Quest {
        quest: &'a Quest,
        /// Events that advanced the quest, oldest first.
        events: Vec<&'a Event>,
    },
}

/// What a details panel shows for a selected edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDetails<'a> {
    pub relation: Relation,
    pub from: &'a str,
    pub to: &'a str,
}

impl Graph {
    /// Label of a node, or its identifier if the node is unknown.
    pub fn label_or_id<'a>(&'a self, node: &'a NodeRef) -> &'a str {
        self.label(node).unwrap_or(node.id.as_str())
    }

    fn name_of(&self, kind: NodeKind, id: &str) -> Option<&str> {
        self.label(&NodeRef::new(kind, id))
    }

    fn events_where<'a>(&'a self, pred: impl Fn(&Event) -> bool) -> Vec<&'a Event> {
        let mut events: Vec<_> = self.nodes.events.iter().filter(|e| pred(e)).collect();
        sort_chronologically(&mut events);
        events
    }

    /// Details for a node, `None` if the node is not in the graph.
    pub fn details(&self, node: &NodeRef) -> Option<NodeDetails<'_>> {
        let id = node.id.as_str();
        let details = match node.kind {
            NodeKind::Event => {
                let event = self.event(id)?;
                NodeDetails::Event {
                    event,
                    location: event.location.as_ref().map(|l| {
                        self.name_of(NodeKind::Location, l.as_str()).unwrap_or(l.as_str())
                    }),
                    characters: event
                        .characters
                        .iter()
                        .map(|c| self.name_of(NodeKind::Character, c.as_str()).unwrap_or(c.as_str()))
                        .collect(),
                    quests: event
                        .quest_ids
                        .iter()
                        .map(|q| self.name_of(NodeKind::Quest, q.as_str()).unwrap_or(q.as_str()))
                        .collect(),
                }
            }
            NodeKind::Character => NodeDetails::Character {
                character: self.character(id)?,
                events: self.events_where(|e| e.involves_character(id)),
            },
            NodeKind::Location => NodeDetails::Location {
                location: self.location(id)?,
                events: self.events_where(|e| e.occurs_at(id)),
            },
            NodeKind::Quest => NodeDetails::Quest {
                quest: self.quest(id)?,
                events: self.events_where(|e| e.advances_quest(id)),
            },
        };
        Some(details)
    }

    /// Details for an edge with both endpoints resolved to labels.
    pub fn edge_details(&self, id: &EdgeId) -> Option<EdgeDetails<'_>> {
        let edge = self.edge(id)?;
        let from = self
            .event(edge.from.as_str())
            .map(|e| e.title.as_str())
            .unwrap_or(edge.from.as_str());
        let target = edge.target();
        let to = self.label(&target).unwrap_or(edge.to.as_str());
        Some(EdgeDetails {
            relation: edge.relation,
            from,
            to,
        })
    }
}
