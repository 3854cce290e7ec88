//! Style rules and the rendering surface seam.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, NodeKind, Neighborhood, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    RoundRectangle,
    Rectangle,
    Ellipse,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub size: u32,
    pub fill: String,
    pub border: String,
}

impl NodeStyle {
    fn with_shape(shape: NodeShape) -> Self {
        Self {
            shape,
            size: 54,
            fill: "#1a2230".to_string(),
            border: "#2d3a59".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub color: String,
    pub line: LineStyle,
    pub width: u32,
}

impl EdgeStyle {
    /// The default look of each relation.
    fn for_relation(relation: Relation) -> Self {
        let (color, line) = match relation {
            Relation::Participates => ("#3498db", LineStyle::Solid),
            Relation::OccursAt => ("#2ecc71", LineStyle::Dashed),
            Relation::AdvancesQuest => ("#e67e22", LineStyle::Dotted),
        };
        Self {
            color: color.to_string(),
            line,
            width: 2,
        }
    }
}

/// Style rules keyed by node kind and edge relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheet {
    pub nodes: BTreeMap<NodeKind, NodeStyle>,
    pub edges: BTreeMap<Relation, EdgeStyle>,
    /// Opacity applied to de-emphasized elements.
    pub faded_opacity: f32,
}

impl Default for StyleSheet {
    fn default() -> Self {
        let nodes = BTreeMap::from([
            (NodeKind::Character, NodeStyle::with_shape(NodeShape::RoundRectangle)),
            (NodeKind::Location, NodeStyle::with_shape(NodeShape::Rectangle)),
            (NodeKind::Quest, NodeStyle::with_shape(NodeShape::Ellipse)),
            (NodeKind::Event, NodeStyle::with_shape(NodeShape::Diamond)),
        ]);
        let edges = Relation::ALL
            .into_iter()
            .map(|r| (r, EdgeStyle::for_relation(r)))
            .collect();
        Self {
            nodes,
            edges,
            faded_opacity: 0.2,
        }
    }
}

impl StyleSheet {
    pub fn node(&self, kind: NodeKind) -> Option<&NodeStyle> {
        self.nodes.get(&kind)
    }

    pub fn edge(&self, relation: Relation) -> Option<&EdgeStyle> {
        self.edges.get(&relation)
    }
}

/// Whatever draws the graph.
///
/// Interaction flows the other way: the host translates clicks into
/// [`super::Tap`] values and hands them to the view.
pub trait RenderSurface {
    /// Replace everything drawn with `graph`.
    fn render(&mut self, graph: &Graph, styles: &StyleSheet);

    /// Emphasize `focus` and fade everything else.
    fn highlight(&mut self, focus: &Neighborhood);

    fn clear_highlight(&mut self);
}

/// A surface that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render(&mut self, _graph: &Graph, _styles: &StyleSheet) {}

    fn highlight(&mut self, _focus: &Neighborhood) {}

    fn clear_highlight(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_model::EntityKind;

    #[test]
    fn test_default_edge_styles() {
        let styles = StyleSheet::default();

        let par = styles.edge(Relation::Participates).unwrap();
        assert_eq!(par.color, "#3498db");
        assert_eq!(par.line, LineStyle::Solid);

        let occ = styles.edge(Relation::OccursAt).unwrap();
        assert_eq!(occ.color, "#2ecc71");
        assert_eq!(occ.line, LineStyle::Dashed);

        let adv = styles.edge(Relation::AdvancesQuest).unwrap();
        assert_eq!(adv.color, "#e67e22");
        assert_eq!(adv.line, LineStyle::Dotted);
    }

    #[test]
    fn test_every_relation_styled() {
        let styles = StyleSheet::default();
        for relation in Relation::ALL {
            assert_eq!(styles.edge(relation).unwrap().width, 2);
        }
    }

    #[test]
    fn test_every_node_kind_styled() {
        let styles = StyleSheet::default();
        for kind in EntityKind::ALL {
            assert!(styles.node(NodeKind::from(kind)).is_some());
        }
        assert_eq!(styles.node(NodeKind::Event).unwrap().shape, NodeShape::Diamond);
    }
}
