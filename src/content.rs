//! Typed analysis results
//!
//! `Content` is the tagged union every consumer matches on. Which variant a
//! result carries is decided by its `FeatureKind` (see `ContentFamily`).

use crate::feature::{ContentFamily, FeatureKind};
use serde::{Deserialize, Serialize};

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One timeline entry. `year` is free text ("1980s", "c. 1200").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub year: String,
    pub event: String,
}

impl TimelineItem {
    pub fn new(year: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            event: event.into(),
        }
    }
}

/// A knowledge-graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub description: String,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        node_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
            description: description.into(),
        }
    }
}

/// A knowledge-graph edge between two node ids.
///
/// Accepts `source`/`target` as input aliases for `from`/`to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(alias = "source")]
    pub from: String,
    #[serde(alias = "target")]
    pub to: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub edge_type: String,
}

impl GraphEdge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            edge_type: edge_type.into(),
        }
    }
}

/// Nodes, edges and a one-paragraph summary.
///
/// Edges may reference ids that no node declares. Such edges are kept;
/// `resolve` reports the missing endpoint as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub summary: String,
}

impl Graph {
    /// The fixed two-node graph used when a model reply cannot be parsed.
    pub fn placeholder() -> Self {
        Self {
            nodes: vec![
                GraphNode::new("1", "Main topic", "concept", "Central concept of the text"),
                GraphNode::new("2", "Supporting idea", "idea", "Idea that supports the main topic"),
            ],
            edges: vec![GraphEdge::new("1", "2", "related to", "relationship")],
            summary: "Knowledge graph derived from the supplied text".to_string(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up both endpoints of an edge.
    pub fn resolve<'a>(&'a self, edge: &GraphEdge) -> (Option<&'a GraphNode>, Option<&'a GraphNode>) {
        (self.node(&edge.from), self.node(&edge.to))
    }

    /// Edges with at least one endpoint that names no declared node.
    pub fn unresolved_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(move |e| self.node(&e.from).is_none() || self.node(&e.to).is_none())
    }
}

/// The typed payload of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    PlainText(String),
    FaqList(Vec<FaqItem>),
    TimelineList(Vec<TimelineItem>),
    Graph(Graph),
}

impl Content {
    pub fn family(&self) -> ContentFamily {
        match self {
            Self::PlainText(_) => ContentFamily::PlainText,
            Self::FaqList(_) => ContentFamily::FaqList,
            Self::TimelineList(_) => ContentFamily::TimelineList,
            Self::Graph(_) => ContentFamily::Graph,
        }
    }

    /// True for empty text or an empty list. A graph is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::PlainText(s) => s.is_empty(),
            Self::FaqList(items) => items.is_empty(),
            Self::TimelineList(items) => items.is_empty(),
            Self::Graph(g) => g.nodes.is_empty(),
        }
    }
}

/// A finished analysis: heading plus typed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub content: Content,
}

impl AnalysisResult {
    /// Build a result titled from the feature catalog.
    pub fn for_feature(kind: FeatureKind, content: Content) -> Self {
        Self {
            title: kind.info().result_title.to_string(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_edges_resolve() {
        let graph = Graph::placeholder();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        let (from, to) = graph.resolve(&graph.edges[0]);
        assert_eq!(from.map(|n| n.id.as_str()), Some("1"));
        assert_eq!(to.map(|n| n.id.as_str()), Some("2"));
        assert_eq!(graph.unresolved_edges().count(), 0);
    }

    #[test]
    fn dangling_edge_is_kept_and_reported() {
        let graph = Graph {
            nodes: vec![GraphNode::new("a", "A", "concept", "")],
            edges: vec![GraphEdge::new("a", "ghost", "mentions", "")],
            summary: String::new(),
        };
        let (from, to) = graph.resolve(&graph.edges[0]);
        assert!(from.is_some());
        assert!(to.is_none());
        assert_eq!(graph.unresolved_edges().count(), 1);
    }

    #[test]
    fn edge_accepts_source_target_aliases() {
        let edge: GraphEdge =
            serde_json::from_str(r#"{"source": "1", "target": "2", "label": "uses"}"#).unwrap();
        assert_eq!(edge.from, "1");
        assert_eq!(edge.to, "2");
        assert_eq!(edge.edge_type, "");
    }

    #[test]
    fn content_is_adjacently_tagged() {
        let content = Content::FaqList(vec![FaqItem::new("Why?", "Because.")]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "faq_list");
        assert_eq!(json["value"][0]["question"], "Why?");

        let back: Content = serde_json::from_value(json).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn graph_nodes_serialize_type_field() {
        let json = serde_json::to_value(Graph::placeholder()).unwrap();
        assert_eq!(json["nodes"][0]["type"], "concept");
        assert_eq!(json["edges"][0]["from"], "1");
        assert_eq!(json["edges"][0]["to"], "2");
    }

    #[test]
    fn result_title_comes_from_catalog() {
        let result = AnalysisResult::for_feature(FeatureKind::Faq, Content::FaqList(vec![]));
        assert_eq!(result.title, "Frequently asked questions");
        assert!(result.content.is_empty());
    }
}
