//! Model client: the boundary to the hosted language model
//!
//! Defines the client trait and its error type. Two implementations:
//! - `GeminiClient`: calls the Generative Language `generateContent` API (production)
//! - `MockClient`: returns scripted replies and records calls (testing)
//!
//! Callers treat every `ModelError` alike; the variants exist for logs.

mod gemini;

pub use gemini::GeminiClient;

use crate::chat::Turn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Errors from model client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model API key not configured (set {0})")]
    MissingApiKey(String),
    #[error("could not reach model API: {0}")]
    Connection(String),
    #[error("model API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model returned no candidates")]
    EmptyResponse,
    #[error("model response parse error: {0}")]
    ParseError(String),
}

/// Client trait for calling the language model.
///
/// Abstracts over transport (HTTP, mock) so the session and the HTTP
/// endpoint don't depend on how the model is reached.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for logs and health output.
    fn model_name(&self) -> &str;

    /// Send `prompt` with `history` as prior context; return the reply text.
    ///
    /// `history` is chronological and is forwarded in that order.
    async fn invoke(&self, prompt: &str, history: &[Turn]) -> Result<String, ModelError>;
}

/// A call received by `MockClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub history: Vec<Turn>,
}

/// Mock client for testing: returns scripted replies in order.
pub struct MockClient {
    available: bool,
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Notify>>,
}

impl MockClient {
    /// Create a mock client that answers from its script.
    pub fn available() -> Self {
        Self {
            available: true,
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Create a mock client whose every call fails to connect.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: ModelError) -> Self {
        self.push(Err(error));
        self
    }

    /// Hold every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn push(&self, reply: Result<String, ModelError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ModelClient for MockClient {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, prompt: &str, history: &[Turn]) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                prompt: prompt.to_string(),
                history: history.to_vec(),
            });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if !self.available {
            return Err(ModelError::Connection(
                "mock client configured as unavailable".to_string(),
            ));
        }

        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Connection("no scripted reply left".to_string())))
    }
}
