//! Chat history: the turns forwarded to the model and the transcript shown
//! to the reader
//!
//! `ChatHistory::turns` is the model-facing context. It only grows by whole
//! exchanges (human then assistant). The transcript additionally starts with
//! a synthetic greeting that is never sent to the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting that opens every transcript.
pub const GREETING: &str =
    "Hello! I have read your document. Ask me anything about this book!";

/// Starter questions offered next to the chat input.
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "Summarize the first chapter",
    "What are the main concepts in the book?",
    "What message does the author want to convey?",
    "What is new or surprising in this book?",
    "How can I apply this knowledge?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message of conversational context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Role::Human, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A transcript entry as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Prior turns plus the display transcript.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    turns: Vec<Turn>,
    transcript: Vec<ChatMessage>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHistory {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            transcript: vec![ChatMessage::new(Sender::Ai, GREETING)],
        }
    }

    /// Turns to forward to the model, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Number of completed exchanges.
    pub fn exchange_count(&self) -> usize {
        self.turns.len() / 2
    }

    /// Append one completed exchange: the question, then the answer.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();

        self.transcript.push(ChatMessage::new(Sender::User, question.clone()));
        self.transcript.push(ChatMessage::new(Sender::Ai, answer.clone()));
        self.turns.push(Turn::human(question));
        self.turns.push(Turn::assistant(answer));
    }

    /// Forget every exchange and restore the greeting.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
