//! Folio: document analysis over a hosted language model
//!
//! Turns a document into typed reading aids (summary, mind map, FAQ,
//! timeline, knowledge graph, key insights) by prompting a model and
//! normalizing its replies into a fixed set of result shapes.
//!
//! # Core Concepts
//!
//! - **Feature kinds**: the fixed set of analyses, each mapped to one content shape
//! - **Normalizer**: strict JSON parse first, deterministic fallback second; never fails
//! - **Session**: one document, its results keyed by feature kind, and a chat history
//!
//! # Example
//!
//! ```
//! use folio::{normalize, Content, FaqItem, FeatureKind};
//!
//! let content = normalize(FeatureKind::Faq, "What is X?\nX is Y.");
//! assert_eq!(content, Content::FaqList(vec![FaqItem::new("What is X?", "X is Y.")]));
//! ```

pub mod chat;
pub mod config;
mod content;
mod feature;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod server;
mod session;

pub use chat::{ChatHistory, ChatMessage, Role, Sender, Turn};
pub use config::{ConfigError, FolioConfig, ModelConfig, ServerConfig};
pub use content::{AnalysisResult, Content, FaqItem, Graph, GraphEdge, GraphNode, TimelineItem};
pub use feature::{ContentFamily, FeatureInfo, FeatureKind, UnknownFeature, CATALOG};
pub use model::{GeminiClient, MockClient, ModelClient, ModelError};
pub use normalize::{normalize, Normalized, Normalizer, NormalizerConfig, ParsePath};
pub use session::{AnalysisSession, Document, Notice, NoticeLevel, SessionError, Surface};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
