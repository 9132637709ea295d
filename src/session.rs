//! Analysis session: one loaded document and everything derived from it
//!
//! The session owns the result store (keyed by feature kind), the chat
//! history, and the busy set that allows at most one in-flight request per
//! surface. Loading a new document bumps a generation counter; a model reply
//! that arrives for an older generation is discarded instead of stored.

use crate::chat::{ChatHistory, ChatMessage, Turn};
use crate::content::AnalysisResult;
use crate::feature::FeatureKind;
use crate::model::{ModelClient, ModelError};
use crate::normalize::Normalizer;
use crate::prompt;
use dashmap::{DashMap, DashSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub text: Arc<str>,
}

/// Errors surfaced to the reader by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no document text to analyze")]
    EmptyDocument,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("{0} is already in progress")]
    Busy(Surface),

    #[error("could not connect to the model service: {0}")]
    Transport(#[from] ModelError),

    #[error("document or conversation changed before the model replied")]
    Stale,
}

/// Something that can have a request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Feature(FeatureKind),
    Chat,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feature(kind) => write!(f, "{} analysis", kind),
            Self::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A one-line, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn analysis_ready(kind: FeatureKind) -> Self {
        Self::new(
            NoticeLevel::Success,
            format!("{} ready", kind.info().title),
            format!("{} was generated from the document.", kind.info().result_title),
        )
    }

    /// The notification for the outcome of `AnalysisSession::analyze`.
    pub fn for_analysis(kind: FeatureKind, outcome: &Result<AnalysisResult, SessionError>) -> Self {
        match outcome {
            Ok(_) => Self::analysis_ready(kind),
            Err(e) => e.notice(),
        }
    }
}

impl SessionError {
    /// The notification shown for this error.
    pub fn notice(&self) -> Notice {
        match self {
            Self::EmptyDocument => Notice::new(
                NoticeLevel::Error,
                "Nothing to analyze",
                "Load a document with text before requesting an analysis.",
            ),
            Self::EmptyQuestion => Notice::new(
                NoticeLevel::Error,
                "Empty question",
                "Type a question about the document first.",
            ),
            Self::Busy(surface) => Notice::new(
                NoticeLevel::Info,
                "Please wait",
                format!("The {} is still running.", surface),
            ),
            Self::Transport(_) => Notice::new(
                NoticeLevel::Error,
                "Could not connect",
                "Could not connect to the AI service. Please try again.",
            ),
            Self::Stale => Notice::new(
                NoticeLevel::Info,
                "Result discarded",
                "The document or conversation changed while the AI was answering.",
            ),
        }
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    document: Option<Document>,
    generation: u64,
}

/// Chat history plus an epoch bumped on every reset.
#[derive(Debug, Default)]
struct ChatState {
    history: ChatHistory,
    epoch: u64,
}

impl ChatState {
    fn reset(&mut self) {
        self.history.clear();
        self.epoch += 1;
    }
}

/// Removes its surface from the busy set when dropped.
struct BusyGuard<'a> {
    busy: &'a DashSet<Surface>,
    surface: Surface,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.remove(&self.surface);
    }
}

pub struct AnalysisSession {
    client: Arc<dyn ModelClient>,
    normalizer: Normalizer,
    state: RwLock<DocumentState>,
    results: DashMap<FeatureKind, AnalysisResult>,
    busy: DashSet<Surface>,
    chat: Mutex<ChatState>,
}

impl AnalysisSession {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_normalizer(client, Normalizer::new())
    }

    pub fn with_normalizer(client: Arc<dyn ModelClient>, normalizer: Normalizer) -> Self {
        Self {
            client,
            normalizer,
            state: RwLock::new(DocumentState::default()),
            results: DashMap::new(),
            busy: DashSet::new(),
            chat: Mutex::new(ChatState::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, DocumentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DocumentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_chat(&self) -> MutexGuard<'_, ChatState> {
        self.chat.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current document. Results and chat are discarded.
    pub fn load_document(&self, name: impl Into<String>, text: impl Into<String>) -> Uuid {
        let document = Document {
            id: Uuid::new_v4(),
            name: name.into(),
            text: Arc::from(text.into()),
        };
        let id = document.id;

        let mut state = self.write_state();
        info!(document = %document.name, chars = document.text.len(), "document loaded");
        state.document = Some(document);
        state.generation += 1;
        self.results.clear();
        self.lock_chat().reset();
        id
    }

    /// Drop the document, its results and the chat.
    pub fn clear(&self) {
        let mut state = self.write_state();
        state.document = None;
        state.generation += 1;
        self.results.clear();
        self.lock_chat().reset();
    }

    pub fn document(&self) -> Option<Document> {
        self.read_state().document.clone()
    }

    /// Current generation and document text, or `EmptyDocument`.
    fn snapshot(&self) -> Result<(u64, Arc<str>), SessionError> {
        let state = self.read_state();
        match &state.document {
            Some(doc) if !doc.text.trim().is_empty() => Ok((state.generation, doc.text.clone())),
            _ => Err(SessionError::EmptyDocument),
        }
    }

    fn acquire(&self, surface: Surface) -> Result<BusyGuard<'_>, SessionError> {
        if self.busy.insert(surface) {
            Ok(BusyGuard {
                busy: &self.busy,
                surface,
            })
        } else {
            Err(SessionError::Busy(surface))
        }
    }

    pub fn is_busy(&self, kind: FeatureKind) -> bool {
        self.busy.contains(&Surface::Feature(kind))
    }

    pub fn is_chat_busy(&self) -> bool {
        self.busy.contains(&Surface::Chat)
    }

    /// Run one analysis and store its result, replacing any earlier one.
    ///
    /// On a model failure the previous result for `kind` is left untouched.
    pub async fn analyze(&self, kind: FeatureKind) -> Result<AnalysisResult, SessionError> {
        let (generation, text) = self.snapshot()?;
        let _guard = self.acquire(Surface::Feature(kind))?;

        info!(feature = %kind, model = self.client.model_name(), "requesting analysis");
        let raw = self
            .client
            .invoke(&prompt::feature_prompt(kind, &text), &[])
            .await
            .map_err(|e| {
                warn!(feature = %kind, error = %e, "model call failed");
                SessionError::Transport(e)
            })?;

        let normalized = self.normalizer.normalize_with_path(kind, &raw);
        debug!(feature = %kind, path = ?normalized.path, "reply normalized");
        let result = AnalysisResult::for_feature(kind, normalized.content);

        // Hold the read lock so a concurrent load cannot clear in between
        let state = self.read_state();
        if state.generation != generation {
            debug!(feature = %kind, "discarding reply for a replaced document");
            return Err(SessionError::Stale);
        }
        self.results.insert(kind, result.clone());
        info!(feature = %kind, "analysis stored");
        Ok(result)
    }

    /// Ask a question about the document, with prior turns as context.
    ///
    /// A completed exchange appends exactly two turns; a failed one appends
    /// nothing.
    pub async fn ask(&self, question: &str) -> Result<String, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        let (generation, text) = self.snapshot()?;
        let _guard = self.acquire(Surface::Chat)?;

        let (epoch, history) = {
            let chat = self.lock_chat();
            (chat.epoch, chat.history.turns().to_vec())
        };
        debug!(turns = history.len(), history = %prompt::format_history(&history), "asking");
        let answer = self
            .client
            .invoke(&prompt::chat_prompt(&text, question), &history)
            .await
            .map_err(|e| {
                warn!(error = %e, "chat model call failed");
                SessionError::Transport(e)
            })?;
        let answer = answer.trim().to_string();

        let state = self.read_state();
        let mut chat = self.lock_chat();
        if state.generation != generation || chat.epoch != epoch {
            debug!("discarding chat reply for a cleared conversation");
            return Err(SessionError::Stale);
        }
        chat.history.record_exchange(question, answer.clone());
        Ok(answer)
    }

    /// Reset the conversation. A reply still in flight is discarded.
    pub fn clear_chat(&self) {
        self.lock_chat().reset();
    }

    pub fn prior_turns(&self) -> Vec<Turn> {
        self.lock_chat().history.turns().to_vec()
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock_chat().history.transcript().to_vec()
    }

    pub fn result(&self, kind: FeatureKind) -> Option<AnalysisResult> {
        self.results.get(&kind).map(|r| r.clone())
    }

    /// Snapshot of every stored result.
    pub fn results(&self) -> BTreeMap<FeatureKind, AnalysisResult> {
        self.results
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }
}
