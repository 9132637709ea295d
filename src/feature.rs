//! Feature catalog: the fixed set of analyses a reader can request
//!
//! Each `FeatureKind` maps to exactly one `ContentFamily`, which decides the
//! shape the normalizer produces for it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// An analysis type the user can request.
///
/// Serializes as the wire id (`"knowledge-graph"`, `"key-insights"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKind {
    Summary,
    Mindmap,
    Faq,
    Timeline,
    KnowledgeGraph,
    KeyInsights,
}

/// The `Content` variant family a feature kind produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    PlainText,
    FaqList,
    TimelineList,
    Graph,
}

/// Error returned when a wire id names no known feature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature: {0}")]
pub struct UnknownFeature(pub String);

impl FeatureKind {
    /// Every feature kind, in catalog order.
    pub const ALL: [FeatureKind; 6] = [
        FeatureKind::Summary,
        FeatureKind::Mindmap,
        FeatureKind::KnowledgeGraph,
        FeatureKind::Faq,
        FeatureKind::Timeline,
        FeatureKind::KeyInsights,
    ];

    /// The wire id used in requests and result maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Mindmap => "mindmap",
            Self::Faq => "faq",
            Self::Timeline => "timeline",
            Self::KnowledgeGraph => "knowledge-graph",
            Self::KeyInsights => "key-insights",
        }
    }

    /// Which content shape this kind normalizes into.
    pub fn content_family(&self) -> ContentFamily {
        match self {
            Self::Summary | Self::Mindmap | Self::KeyInsights => ContentFamily::PlainText,
            Self::Faq => ContentFamily::FaqList,
            Self::Timeline => ContentFamily::TimelineList,
            Self::KnowledgeGraph => ContentFamily::Graph,
        }
    }

    /// Whether the prompt for this kind asks the model for JSON.
    pub fn expects_json(&self) -> bool {
        self.content_family() != ContentFamily::PlainText
    }

    /// Static display metadata for this kind.
    pub fn info(&self) -> &'static FeatureInfo {
        match self {
            Self::Summary => &CATALOG[0],
            Self::Mindmap => &CATALOG[1],
            Self::KnowledgeGraph => &CATALOG[2],
            Self::Faq => &CATALOG[3],
            Self::Timeline => &CATALOG[4],
            Self::KeyInsights => &CATALOG[5],
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Display metadata for one feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureInfo {
    pub kind: FeatureKind,
    /// Label for the button that triggers the analysis
    pub title: &'static str,
    /// Heading shown above the finished result
    pub result_title: &'static str,
    /// Icon name understood by the front end
    pub icon: &'static str,
    pub description: &'static str,
}

/// The feature catalog, in display order.
pub static CATALOG: [FeatureInfo; 6] = [
    FeatureInfo {
        kind: FeatureKind::Summary,
        title: "Summary",
        result_title: "Content summary",
        icon: "file-text",
        description: "A short overview of the document's main points",
    },
    FeatureInfo {
        kind: FeatureKind::Mindmap,
        title: "Mind Map",
        result_title: "Mind map",
        icon: "map",
        description: "A tree of the document's topics and subtopics",
    },
    FeatureInfo {
        kind: FeatureKind::KnowledgeGraph,
        title: "Knowledge Graph",
        result_title: "Knowledge Graph",
        icon: "network",
        description: "Entities and concepts with the relationships between them",
    },
    FeatureInfo {
        kind: FeatureKind::Faq,
        title: "FAQ",
        result_title: "Frequently asked questions",
        icon: "help-circle",
        description: "Questions a reader is likely to ask, with answers",
    },
    FeatureInfo {
        kind: FeatureKind::Timeline,
        title: "Timeline",
        result_title: "Timeline",
        icon: "clock",
        description: "Dated events mentioned in the document, in order",
    },
    FeatureInfo {
        kind: FeatureKind::KeyInsights,
        title: "Key Insights",
        result_title: "Key insights",
        icon: "lightbulb",
        description: "The most important takeaways of the document",
    },
];
