//! Graph view - selection state machine over a rendered graph.
//!
//! Selection is one of none, a node or an edge. Tapping a node focuses its
//! closed neighborhood, tapping an edge focuses the edge and its endpoints,
//! and tapping the background clears the focus. Whenever the graph is
//! replaced, a selection that no longer exists falls back to none.

mod highlight;
mod style;

pub use highlight::*;
pub use style::*;

use tracing::debug;

use crate::graph::{build_graph, EdgeDetails, EdgeId, Graph, Neighborhood, NodeDetails, NodeRef};
use crate::timeline::{EventQuery, EventSource};

/// A user interaction reported by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tap {
    Node(NodeRef),
    Edge(EdgeId),
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeRef),
    Edge(EdgeId),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// Owns the displayed graph, the selection and the highlight, and keeps the
/// surface in sync with them.
#[derive(Debug)]
pub struct GraphView<R> {
    surface: R,
    styles: StyleSheet,
    graph: Graph,
    selection: Selection,
    highlight: Highlight,
    filter: String,
}

impl<R: RenderSurface> GraphView<R> {
    pub fn new(surface: R) -> Self {
        Self {
            surface,
            styles: StyleSheet::default(),
            graph: Graph::new(),
            selection: Selection::None,
            highlight: Highlight::new(),
            filter: String::new(),
        }
    }

    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// Drive the selection state machine. Taps on elements missing from the
    /// current graph are ignored.
    pub fn handle_tap(&mut self, tap: Tap) -> &Selection {
        match tap {
            Tap::Node(node) => match self.graph.closed_neighborhood(&node) {
                Some(hood) => self.select(Selection::Node(node), hood),
                None => debug!(%node, "tap on unknown node ignored"),
            },
            Tap::Edge(edge) => match self.graph.edge_neighborhood(&edge) {
                Some(hood) => self.select(Selection::Edge(edge), hood),
                None => debug!(%edge, "tap on unknown edge ignored"),
            },
            Tap::Background => self.clear_selection(),
        }
        &self.selection
    }

    /// Replace the displayed graph.
    ///
    /// The selection survives if its node or edge is still present, with the
    /// highlight recomputed on the new graph; otherwise it resets.
    pub fn apply_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.surface.render(&self.graph, &self.styles);

        match self.focus_of(&self.selection) {
            Some(hood) => {
                self.surface.highlight(&hood);
                self.highlight.focus_on(hood);
            }
            None => {
                if !self.selection.is_none() {
                    debug!(selection = ?self.selection, "selection gone after rebuild");
                }
                self.clear_selection();
            }
        }
    }

    /// Set the free-text filter and rebuild from the events `source`
    /// returns for it.
    pub fn set_filter<S>(&mut self, text: impl Into<String>, source: &S)
    where
        S: EventSource + ?Sized,
    {
        self.filter = text.into();
        self.refresh(source);
    }

    /// Re-query `source` with the current filter and rebuild.
    pub fn refresh<S>(&mut self, source: &S)
    where
        S: EventSource + ?Sized,
    {
        let events = source.query_events(&EventQuery::text(self.filter.clone()));
        self.apply_graph(build_graph(&events));
    }

    /// Details of the selected node, for a details panel.
    pub fn selected_node(&self) -> Option<NodeDetails<'_>> {
        match &self.selection {
            Selection::Node(node) => self.graph.details(node),
            _ => None,
        }
    }

    pub fn selected_edge(&self) -> Option<EdgeDetails<'_>> {
        match &self.selection {
            Selection::Edge(edge) => self.graph.edge_details(edge),
            _ => None,
        }
    }

    fn select(&mut self, selection: Selection, hood: Neighborhood) {
        self.surface.highlight(&hood);
        self.highlight.focus_on(hood);
        self.selection = selection;
    }

    fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.highlight.clear();
        self.surface.clear_highlight();
    }

    fn focus_of(&self, selection: &Selection) -> Option<Neighborhood> {
        match selection {
            Selection::None => None,
            Selection::Node(node) => self.graph.closed_neighborhood(node),
            Selection::Edge(edge) => self.graph.edge_neighborhood(edge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_model::Event;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Render(usize),
        Highlight(usize),
        Clear,
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl RenderSurface for Recorder {
        fn render(&mut self, graph: &Graph, _styles: &StyleSheet) {
            self.calls.push(Call::Render(graph.node_count()));
        }

        fn highlight(&mut self, focus: &Neighborhood) {
            self.calls.push(Call::Highlight(focus.nodes.len()));
        }

        fn clear_highlight(&mut self) {
            self.calls.push(Call::Clear);
        }
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new("e1", "Letter arrives", 100)
                .with_characters(["Ava", "Rook"])
                .at("Inn")
                .advancing("q-hunt"),
            Event::new("e2", "Lock deciphered", 200).with_character("Rook").at("Gate"),
        ]
    }

    fn view() -> GraphView<Recorder> {
        let mut view = GraphView::new(Recorder::default());
        view.apply_graph(build_graph(&events()));
        view
    }

    #[test]
    fn test_node_tap_focuses_neighborhood() {
        let mut view = view();
        let rook = NodeRef::character("Rook");

        assert_eq!(view.handle_tap(Tap::Node(rook.clone())), &Selection::Node(rook));
        // Rook, e1 and e2.
        assert_eq!(view.surface().calls.last(), Some(&Call::Highlight(3)));
        assert!(view.highlight().is_faded_node(&NodeRef::location("Inn")));
        assert!(!view.highlight().is_faded_node(&NodeRef::event("e2")));
    }

    #[test]
    fn test_edge_tap_focuses_endpoints() {
        let mut view = view();
        view.handle_tap(Tap::Edge(EdgeId::from("occ-e2")));

        assert_eq!(view.selection(), &Selection::Edge(EdgeId::from("occ-e2")));
        assert_eq!(view.surface().calls.last(), Some(&Call::Highlight(2)));

        let details = view.selected_edge().unwrap();
        assert_eq!(details.to, "Gate");
    }

    #[test]
    fn test_background_tap_clears() {
        let mut view = view();
        view.handle_tap(Tap::Node(NodeRef::event("e1")));
        assert!(view.selected_node().is_some());

        view.handle_tap(Tap::Background);
        assert!(view.selection().is_none());
        assert!(!view.highlight().is_active());
        assert_eq!(view.surface().calls.last(), Some(&Call::Clear));
    }

    #[test]
    fn test_unknown_tap_ignored() {
        let mut view = view();
        view.handle_tap(Tap::Node(NodeRef::event("e1")));
        view.handle_tap(Tap::Node(NodeRef::event("missing")));
        view.handle_tap(Tap::Edge(EdgeId::from("par-missing-0")));

        assert_eq!(view.selection(), &Selection::Node(NodeRef::event("e1")));
    }

    #[test]
    fn test_rebuild_without_selected_node_resets() {
        let mut view = view();
        view.handle_tap(Tap::Node(NodeRef::location("Gate")));

        view.apply_graph(build_graph(&events()[..1]));

        assert!(view.selection().is_none());
        assert!(!view.highlight().is_active());
        assert_eq!(view.surface().calls.last(), Some(&Call::Clear));
    }

    #[test]
    fn test_rebuild_keeps_surviving_selection() {
        let mut view = view();
        let rook = NodeRef::character("Rook");
        view.handle_tap(Tap::Node(rook.clone()));

        let mut more = events();
        more.push(Event::new("e3", "Escape", 300).with_character("Rook"));
        view.apply_graph(build_graph(&more));

        assert_eq!(view.selection(), &Selection::Node(rook));
        assert_eq!(view.surface().calls.last(), Some(&Call::Highlight(4)));
    }

    #[test]
    fn test_rebuild_without_selected_edge_resets() {
        let mut view = view();
        view.handle_tap(Tap::Edge(EdgeId::from("adv-e1-0")));

        let stripped = vec![Event::new("e1", "Letter arrives", 100).at("Inn")];
        view.apply_graph(build_graph(&stripped));
        assert!(view.selection().is_none());
    }

    #[test]
    fn test_filter_rebuilds_and_can_invalidate_selection() {
        let source = events();
        let mut view = view();
        view.handle_tap(Tap::Node(NodeRef::location("Inn")));

        view.set_filter("gate", &source);
        assert_eq!(view.filter(), "gate");
        assert_eq!(view.graph().nodes.events.len(), 1);
        assert!(view.selection().is_none());

        view.set_filter("", source.as_slice());
        assert_eq!(view.graph().nodes.events.len(), 2);
    }
}
