//! Graph builder - derives the node/edge graph from a list of events.

use std::collections::HashSet;

use campaign_model::{Character, Event, Location, Quest, Registry};

use super::{edges_for, Graph, GraphNodes};

/// Where the character/location/quest node sets come from.
#[derive(Debug, Clone, Copy)]
pub enum NodeSource<'a> {
    /// Deduplicate the references found across all events. The identifier
    /// doubles as the display name.
    Synthesized,
    /// Every entity of the registry, plus a synthesized node for any
    /// reference the registry does not know.
    Registry(&'a Registry),
}

/// Builds a [`Graph`] from events. Building has no side effects: identical
/// input always yields an equal graph.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    source: NodeSource<'a>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(source: NodeSource<'a>) -> Self {
        Self { source }
    }

    /// Builder that derives every node from event references.
    pub fn synthesized() -> Self {
        Self::new(NodeSource::Synthesized)
    }

    /// Builder that starts from a fixed registry.
    pub fn with_registry(registry: &'a Registry) -> Self {
        Self::new(NodeSource::Registry(registry))
    }

    /// Build the full graph for `events`, keeping their order.
    pub fn build(&self, events: &[Event]) -> Graph {
        let mut nodes = NodeCollector::default();
        if let NodeSource::Registry(registry) = self.source {
            nodes.seed(registry);
        }

        let mut edges = Vec::new();
        for event in events {
            for character in &event.characters {
                nodes.character(character.as_str());
            }
            if let Some(location) = &event.location {
                nodes.location(location.as_str());
            }
            for quest in &event.quest_ids {
                nodes.quest(quest.as_str());
            }
            edges.extend(edges_for(event));
        }

        Graph {
            nodes: GraphNodes {
                characters: nodes.characters,
                locations: nodes.locations,
                quests: nodes.quests,
                events: events.to_vec(),
            },
            edges,
        }
    }
}

/// Build a graph whose entity nodes are synthesized from event references.
pub fn build_graph(events: &[Event]) -> Graph {
    GraphBuilder::synthesized().build(events)
}

/// Ordered, deduplicating accumulator for entity nodes.
#[derive(Default)]
struct NodeCollector {
    characters: Vec<Character>,
    locations: Vec<Location>,
    quests: Vec<Quest>,
    seen_characters: HashSet<String>,
    seen_locations: HashSet<String>,
    seen_quests: HashSet<String>,
}

impl NodeCollector {
    fn seed(&mut self, registry: &Registry) {
        for c in &registry.characters {
            if self.seen_characters.insert(c.id.0.clone()) {
                self.characters.push(c.clone());
            }
        }
        for l in &registry.locations {
            if self.seen_locations.insert(l.id.0.clone()) {
                self.locations.push(l.clone());
            }
        }
        for q in &registry.quests {
            if self.seen_quests.insert(q.id.0.clone()) {
                self.quests.push(q.clone());
            }
        }
    }

    fn character(&mut self, id: &str) {
        if self.seen_characters.insert(id.to_string()) {
            self.characters.push(Character::new(id, id));
        }
    }

    fn location(&mut self, id: &str) {
        if self.seen_locations.insert(id.to_string()) {
            self.locations.push(Location::new(id, id));
        }
    }

    fn quest(&mut self, id: &str) {
        if self.seen_quests.insert(id.to_string()) {
            self.quests.push(Quest::new(id, id));
        }
    }
}
