//! Campaign graph - characters, locations, quests and events as nodes, with
//! relationship edges derived from what each event references.
//!
//! The graph is never patched in place. Every change to the event list
//! rebuilds it wholesale through [`GraphBuilder`].

mod builder;
mod details;
mod edge;

pub use builder::*;
pub use details::*;
pub use edge::*;

use campaign_model::{Character, EntityKind, Event, Location, Quest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Node categories in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Character,
    Location,
    Quest,
    Event,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Character => "CHARACTER",
            NodeKind::Location => "LOCATION",
            NodeKind::Quest => "QUEST",
            NodeKind::Event => "EVENT",
        }
    }
}

impl From<EntityKind> for NodeKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Character => NodeKind::Character,
            EntityKind::Location => NodeKind::Location,
            EntityKind::Quest => NodeKind::Quest,
        }
    }
}

/// Identity of a node: its kind plus its identifier.
///
/// Identifiers are only unique within a kind, so a character and a location
/// that share an id are still distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeRef {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn character(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Character, id)
    }

    pub fn location(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Location, id)
    }

    pub fn quest(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Quest, id)
    }

    pub fn event(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Event, id)
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// The node sets of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphNodes {
    pub characters: Vec<Character>,
    pub locations: Vec<Location>,
    pub quests: Vec<Quest>,
    pub events: Vec<Event>,
}

/// A closed neighborhood: a set of nodes plus the edges among them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Neighborhood {
    pub nodes: BTreeSet<NodeRef>,
    pub edges: BTreeSet<EdgeId>,
}

impl Neighborhood {
    pub fn contains_node(&self, node: &NodeRef) -> bool {
        self.nodes.contains(node)
    }

    pub fn contains_edge(&self, edge: &EdgeId) -> bool {
        self.edges.contains(edge)
    }
}

/// The aggregate campaign graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Graph {
    pub nodes: GraphNodes,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        let n = &self.nodes;
        n.characters.len() + n.locations.len() + n.quests.len() + n.events.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every node in the graph, characters first and events last.
    pub fn node_refs(&self) -> impl Iterator<Item = NodeRef> + '_ {
        let n = &self.nodes;
        n.characters
            .iter()
            .map(|c| NodeRef::character(c.id.as_str()))
            .chain(n.locations.iter().map(|l| NodeRef::location(l.id.as_str())))
            .chain(n.quests.iter().map(|q| NodeRef::quest(q.id.as_str())))
            .chain(n.events.iter().map(|e| NodeRef::event(e.id.as_str())))
    }

    /// Check if a node exists in the graph.
    pub fn contains(&self, node: &NodeRef) -> bool {
        let id = node.id.as_str();
        match node.kind {
            NodeKind::Character => self.character(id).is_some(),
            NodeKind::Location => self.location(id).is_some(),
            NodeKind::Quest => self.quest(id).is_some(),
            NodeKind::Event => self.event(id).is_some(),
        }
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.nodes.characters.iter().find(|c| c.id.as_str() == id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.nodes.locations.iter().find(|l| l.id.as_str() == id)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.nodes.quests.iter().find(|q| q.id.as_str() == id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.nodes.events.iter().find(|e| e.id.as_str() == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == *id)
    }

    /// Display label of a node: its name, or the title for events.
    pub fn label(&self, node: &NodeRef) -> Option<&str> {
        let id = node.id.as_str();
        match node.kind {
            NodeKind::Character => self.character(id).map(|c| c.name.as_str()),
            NodeKind::Location => self.location(id).map(|l| l.name.as_str()),
            NodeKind::Quest => self.quest(id).map(|q| q.name.as_str()),
            NodeKind::Event => self.event(id).map(|e| e.title.as_str()),
        }
    }

    /// All edges touching a node.
    pub fn edges_of<'a>(&'a self, node: &'a NodeRef) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node))
    }

    /// The node together with every edge touching it and the nodes at the
    /// other end of those edges. `None` if the node is not in the graph.
    pub fn closed_neighborhood(&self, node: &NodeRef) -> Option<Neighborhood> {
        if !self.contains(node) {
            return None;
        }

        let mut hood = Neighborhood::default();
        hood.nodes.insert(node.clone());
        for edge in self.edges_of(node) {
            hood.edges.insert(edge.id.clone());
            hood.nodes.insert(edge.source());
            hood.nodes.insert(edge.target());
        }
        Some(hood)
    }

    /// The edge together with its two endpoints.
    pub fn edge_neighborhood(&self, id: &EdgeId) -> Option<Neighborhood> {
        let edge = self.edge(id)?;
        let mut hood = Neighborhood::default();
        hood.edges.insert(edge.id.clone());
        hood.nodes.insert(edge.source());
        hood.nodes.insert(edge.target());
        Some(hood)
    }

    /// Check that every edge endpoint is a node of this graph.
    pub fn is_consistent(&self) -> bool {
        self.edges
            .iter()
            .all(|e| self.contains(&e.source()) && self.contains(&e.target()))
    }
}
