//! Response normalization: raw model text to typed `Content`
//!
//! Two explicit paths per structured feature: a strict JSON parse, then a
//! deterministic line heuristic when the strict parse does not match. The
//! normalizer never fails; every input yields the variant its feature kind
//! requires.

pub mod fallback;
pub mod structured;

use crate::content::{Content, Graph};
use crate::feature::FeatureKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Year stamped on timeline entries recovered from unstructured prose.
///
/// No year can be read from a line of prose, so this is a stand-in, not a
/// date. Deployments that would rather show an explicit marker set
/// `NormalizerConfig::placeholder_year` (for example to `"unknown"`).
pub const PLACEHOLDER_YEAR: &str = "2024";

/// Tunables for the fallback heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub placeholder_year: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            placeholder_year: PLACEHOLDER_YEAR.to_string(),
        }
    }
}

/// Which path produced a normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePath {
    /// Plain-text feature; the reply was only trimmed
    Passthrough,
    /// The reply parsed as JSON of the expected shape
    Structured,
    /// The reply did not parse; a heuristic or placeholder was used
    Fallback,
}

/// Normalized content plus the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub content: Content,
    pub path: ParsePath,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Map `raw` to the content variant required by `kind`.
    pub fn normalize(&self, kind: FeatureKind, raw: &str) -> Content {
        self.normalize_with_path(kind, raw).content
    }

    pub fn normalize_with_path(&self, kind: FeatureKind, raw: &str) -> Normalized {
        let (content, path) = match kind {
            FeatureKind::Summary | FeatureKind::Mindmap | FeatureKind::KeyInsights => (
                Content::PlainText(raw.trim().to_string()),
                ParsePath::Passthrough,
            ),
            FeatureKind::Faq => match structured::parse_faq(raw) {
                Some(items) => (Content::FaqList(items), ParsePath::Structured),
                None => (Content::FaqList(fallback::faq(raw)), ParsePath::Fallback),
            },
            FeatureKind::Timeline => match structured::parse_timeline(raw) {
                Some(items) => (Content::TimelineList(items), ParsePath::Structured),
                None => (
                    Content::TimelineList(fallback::timeline(raw, &self.config.placeholder_year)),
                    ParsePath::Fallback,
                ),
            },
            FeatureKind::KnowledgeGraph => {
                let (graph, path) = self.graph_with_path(raw);
                (Content::Graph(graph), path)
            }
        };

        if path == ParsePath::Fallback {
            log_fallback(kind, raw);
        }

        Normalized { content, path }
    }

    /// Knowledge-graph normalization without the `Content` wrapper.
    pub fn graph(&self, raw: &str) -> Graph {
        let (graph, path) = self.graph_with_path(raw);
        if path == ParsePath::Fallback {
            log_fallback(FeatureKind::KnowledgeGraph, raw);
        }
        graph
    }

    fn graph_with_path(&self, raw: &str) -> (Graph, ParsePath) {
        match structured::parse_graph(raw) {
            Some(graph) => (graph, ParsePath::Structured),
            None => (fallback::graph(raw), ParsePath::Fallback),
        }
    }
}

fn log_fallback(kind: FeatureKind, raw: &str) {
    debug!(
        feature = %kind,
        reply_len = raw.len(),
        "model reply is not structured JSON; using fallback"
    );
}

/// Normalize with default settings.
pub fn normalize(kind: FeatureKind, raw: &str) -> Content {
    Normalizer::new().normalize(kind, raw)
}
