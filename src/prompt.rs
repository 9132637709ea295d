//! Prompt templates for each feature and for chat

use crate::chat::Turn;
use crate::feature::FeatureKind;

const FAQ_SHAPE: &str = r#"[
  {"question": "A question a reader might ask", "answer": "Its answer"},
  ...
]"#;

const TIMELINE_SHAPE: &str = r#"[
  {"year": "Year or period", "event": "What happened"},
  ...
]"#;

const GRAPH_SHAPE: &str = r#"{
  "nodes": [
    {"id": "1", "label": "Entity name", "type": "kind", "description": "short description"},
    ...
  ],
  "edges": [
    {"from": "1", "to": "2", "label": "relationship", "type": "relationship kind"},
    ...
  ],
  "summary": "A short summary of this knowledge graph"
}"#;

/// Build the instruction sent to the model for `kind` over `document`.
pub fn feature_prompt(kind: FeatureKind, document: &str) -> String {
    match kind {
        FeatureKind::Summary => format!(
            "Summarize the following document. Cover its main topics in a short \
             introduction followed by bullet points.\n\nDocument: {document}"
        ),
        FeatureKind::Mindmap => format!(
            "Create a mind map of the following document as an indented text tree, \
             with the central topic first and its branches and sub-branches below \
             it.\n\nDocument: {document}"
        ),
        FeatureKind::KeyInsights => format!(
            "List the most important insights a reader should take away from the \
             following document, one per line.\n\nDocument: {document}"
        ),
        FeatureKind::Faq => json_prompt(
            "Write frequently asked questions, with answers, about the following document.",
            document,
            FAQ_SHAPE,
        ),
        FeatureKind::Timeline => json_prompt(
            "Extract the dated events mentioned in the following document, in \
             chronological order.",
            document,
            TIMELINE_SHAPE,
        ),
        FeatureKind::KnowledgeGraph => json_prompt(
            "Create a knowledge graph from the following document. Extract the main \
             entities and concepts and the relationships between them, suitable for \
             drawing as nodes and edges.",
            document,
            GRAPH_SHAPE,
        ),
    }
}

fn json_prompt(task: &str, document: &str, shape: &str) -> String {
    format!(
        "{task}\n\nDocument: {document}\n\nReturn JSON in this format:\n{shape}\n\n\
         Return only the JSON, with no other text."
    )
}

/// Build a chat question grounded in the document.
pub fn chat_prompt(document: &str, question: &str) -> String {
    format!(
        "You are a reading assistant. Answer the reader's question using the \
         document below. If the document does not cover it, say so.\n\n\
         Document: {document}\n\nQuestion: {question}"
    )
}

/// Render turns as `role: text` lines, oldest first.
pub fn format_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
