//! Shared fixtures for folio integration tests
//!
//! A short sample document plus model replies in the shapes the prompts
//! ask for, and the prose a model produces when it ignores them.

#![allow(dead_code)]

use folio::{AnalysisSession, MockClient};
use std::sync::Arc;

pub const SAMPLE_DOCUMENT: &str = "\
Artificial intelligence is changing the world. This book explores machine
learning, from basic concepts to real applications.

Chapter 1: Introduction
Alan Turing proposed his famous test in 1950. The term artificial
intelligence was coined in 1956.

Chapter 2: Machine Learning
Supervised, unsupervised and reinforcement learning are the three main
families. Deep learning uses neural networks with many hidden layers.";

pub const FAQ_JSON: &str = r#"[
  {"question": "What is machine learning?", "answer": "A branch of AI that learns from data."},
  {"question": "Who proposed the Turing test?", "answer": "Alan Turing, in 1950."}
]"#;

pub const FAQ_PROSE: &str = "\
What is machine learning?
A branch of AI that learns from data.
Who proposed the Turing test?
Alan Turing.
He did so in 1950.
What comes next?";

pub const TIMELINE_JSON: &str = r#"[
  {"year": "1950", "event": "Alan Turing proposes the Turing test"},
  {"year": "1956", "event": "The term artificial intelligence is coined"}
]"#;

pub const TIMELINE_PROSE: &str = "\
Turing proposes his test

The term AI is coined
Deep learning takes off";

pub const GRAPH_JSON: &str = r#"{
  "nodes": [
    {"id": "1", "label": "Artificial intelligence", "type": "field", "description": "The broad discipline"},
    {"id": "2", "label": "Machine learning", "type": "field", "description": "Learning from data"},
    {"id": "3", "label": "Alan Turing", "type": "person", "description": "Proposed the Turing test"}
  ],
  "edges": [
    {"from": "2", "to": "1", "label": "subfield of", "type": "hierarchy"},
    {"from": "3", "to": "1", "label": "pioneered", "type": "influence"}
  ],
  "summary": "How AI, machine learning and Alan Turing relate"
}"#;

pub const GRAPH_PROSE: &str =
    "The document is about artificial intelligence and machine learning.";

/// A session over `SAMPLE_DOCUMENT` backed by `client`.
pub fn loaded_session(client: MockClient) -> (Arc<AnalysisSession>, Arc<MockClient>) {
    let client = Arc::new(client);
    let session = Arc::new(AnalysisSession::new(client.clone()));
    session.load_document("ai-book.pdf", SAMPLE_DOCUMENT);
    (session, client)
}
