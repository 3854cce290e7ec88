//! Focus tracking for neighborhood highlighting.

use crate::graph::{EdgeId, Graph, Neighborhood, NodeRef};

/// Which part of the graph is emphasized. Everything outside the focus is
/// faded; without a focus nothing is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlight {
    focus: Option<Neighborhood>,
}

impl Highlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_on(&mut self, focus: Neighborhood) {
        self.focus = Some(focus);
    }

    pub fn clear(&mut self) {
        self.focus = None;
    }

    pub fn focus(&self) -> Option<&Neighborhood> {
        self.focus.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.focus.is_some()
    }

    pub fn is_faded_node(&self, node: &NodeRef) -> bool {
        self.focus.as_ref().is_some_and(|f| !f.contains_node(node))
    }

    pub fn is_faded_edge(&self, edge: &EdgeId) -> bool {
        self.focus.as_ref().is_some_and(|f| !f.contains_edge(edge))
    }

    /// Nodes of `graph` currently faded.
    pub fn faded_nodes(&self, graph: &Graph) -> Vec<NodeRef> {
        graph.node_refs().filter(|n| self.is_faded_node(n)).collect()
    }

    /// Edges of `graph` currently faded.
    pub fn faded_edges<'a>(&self, graph: &'a Graph) -> Vec<&'a EdgeId> {
        graph
            .edges
            .iter()
            .map(|e| &e.id)
            .filter(|id| self.is_faded_edge(id))
            .collect()
    }
}
