//! Strict parsing of model replies into typed content
//!
//! Each parser returns `None` when the reply is not JSON of the expected
//! shape; the caller then falls back to the line heuristics. Individual
//! malformed elements inside an otherwise valid array are dropped.

use crate::content::{FaqItem, Graph, GraphEdge, GraphNode, TimelineItem};
use serde_json::Value;
use std::collections::HashSet;

/// The JSON candidate inside a reply.
///
/// Models often wrap JSON in a Markdown fence even when told not to. A fence
/// is only unwrapped when it encloses the whole (trimmed) reply.
pub fn json_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    strip_fence(trimmed).unwrap_or(trimmed)
}

fn strip_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("```")?.strip_suffix("```")?;
    // Drop a language tag such as ```json
    let body = match inner.split_once('\n') {
        Some((tag, rest)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => inner,
    };
    Some(body.trim())
}

fn parse_value(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(json_payload(raw)).ok()
}

/// First non-empty string among `keys`. Numbers are rendered as text so that
/// `{"year": 1956}` and `{"id": 3}` are accepted.
fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let text = match value.get(*key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// Parse a JSON array of `{question, answer}` objects.
pub fn parse_faq(raw: &str) -> Option<Vec<FaqItem>> {
    let value = parse_value(raw)?;
    let items = value.as_array()?;

    Some(
        items
            .iter()
            .filter_map(|item| {
                let question = string_field(item, "question")?;
                let answer = string_field(item, "answer")?;
                Some(FaqItem { question, answer })
            })
            .collect(),
    )
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    let s = value.get(key)?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Parse a JSON array of `{year, event}` objects. Order is preserved.
pub fn parse_timeline(raw: &str) -> Option<Vec<TimelineItem>> {
    let value = parse_value(raw)?;
    let items = value.as_array()?;

    Some(
        items
            .iter()
            .filter_map(|item| {
                // Accept "date" and "description" (common LLM substitutions)
                let year = text_field(item, &["year", "date"])?;
                let event = text_field(item, &["event", "description"])?;
                Some(TimelineItem { year, event })
            })
            .collect(),
    )
}

/// Parse a `{nodes, edges, summary}` object.
///
/// Nodes without an id are dropped and a repeated id keeps its first node.
/// Edges whose endpoints name no declared node are kept as-is. A graph left
/// with no nodes does not count as a match.
pub fn parse_graph(raw: &str) -> Option<Graph> {
    let value = parse_value(raw)?;
    let raw_nodes = value.get("nodes")?.as_array()?;
    let raw_edges = value.get("edges")?.as_array()?;

    let mut seen = HashSet::new();
    let nodes: Vec<GraphNode> = raw_nodes
        .iter()
        .filter_map(|n| {
            let id = text_field(n, &["id"])?;
            if !seen.insert(id.clone()) {
                return None;
            }
            // Accept "name" when the model omits "label"
            let label = text_field(n, &["label", "name"]).unwrap_or_else(|| id.clone());
            Some(GraphNode {
                label,
                node_type: text_field(n, &["type"]).unwrap_or_default(),
                description: text_field(n, &["description"]).unwrap_or_default(),
                id,
            })
        })
        .collect();

    if nodes.is_empty() {
        return None;
    }

    let edges = raw_edges
        .iter()
        .filter_map(|e| {
            Some(GraphEdge {
                from: text_field(e, &["from", "source"])?,
                to: text_field(e, &["to", "target"])?,
                label: text_field(e, &["label", "relationship"]).unwrap_or_default(),
                edge_type: text_field(e, &["type"]).unwrap_or_default(),
            })
        })
        .collect();

    Some(Graph {
        nodes,
        edges,
        summary: text_field(&value, &["summary"]).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_unwraps_whole_reply_fence() {
        assert_eq!(json_payload("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(json_payload("  ```\n{\"a\": 1}\n```  "), "{\"a\": 1}");
        assert_eq!(json_payload("```[3]```"), "[3]");
    }

    #[test]
    fn payload_leaves_partial_fences_alone() {
        let reply = "Here you go:\n```json\n[]\n```";
        assert_eq!(json_payload(reply), reply);
    }

    #[test]
    fn faq_drops_incomplete_elements() {
        let raw = r#"[
            {"question": "What is Rust?", "answer": "A systems language."},
            {"question": "Missing answer?"},
            {"answer": "Missing question."},
            {"question": "  ", "answer": "Blank question."},
            "not an object"
        ]"#;
        let items = parse_faq(raw).unwrap();
        assert_eq!(items, vec![FaqItem::new("What is Rust?", "A systems language.")]);
    }

    #[test]
    fn faq_rejects_non_array_json() {
        assert!(parse_faq(r#"{"question": "Q?", "answer": "A"}"#).is_none());
        assert!(parse_faq("What is X?\nX is Y.").is_none());
    }

    #[test]
    fn timeline_accepts_numeric_years() {
        let raw = r#"[{"year": 1956, "event": "Dartmouth workshop"}, {"year": "1980s", "event": "Expert systems"}]"#;
        let items = parse_timeline(raw).unwrap();
        assert_eq!(
            items,
            vec![
                TimelineItem::new("1956", "Dartmouth workshop"),
                TimelineItem::new("1980s", "Expert systems"),
            ]
        );
    }

    #[test]
    fn timeline_keeps_model_order() {
        let raw = r#"[{"year": "2012", "event": "b"}, {"year": "1950", "event": "a"}]"#;
        let items = parse_timeline(raw).unwrap();
        assert_eq!(items[0].year, "2012");
        assert_eq!(items[1].year, "1950");
    }

    #[test]
    fn graph_dedupes_node_ids_and_keeps_dangling_edges() {
        let raw = r#"{
            "nodes": [
                {"id": 1, "label": "AI", "type": "field"},
                {"id": "1", "label": "Duplicate"},
                {"label": "No id"},
                {"id": "2", "name": "Machine learning"}
            ],
            "edges": [
                {"from": "2", "to": "1", "label": "subfield of"},
                {"source": "2", "target": "9", "label": "cites"},
                {"from": "", "to": "1"}
            ],
            "summary": "AI and ML"
        }"#;
        let graph = parse_graph(raw).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].label, "AI");
        assert_eq!(graph.nodes[1].label, "Machine learning");
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.unresolved_edges().count(), 1);
        assert_eq!(graph.summary, "AI and ML");
    }

    #[test]
    fn graph_without_nodes_is_not_a_match() {
        assert!(parse_graph(r#"{"nodes": [], "edges": []}"#).is_none());
        assert!(parse_graph(r#"{"nodes": [{"id": "1"}]}"#).is_none());
        assert!(parse_graph("[1, 2, 3]").is_none());
    }
}
