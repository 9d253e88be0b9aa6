//! Data models for chat requests and streamed responses.

use itertools::Itertools;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::options::ModelOptions;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => f.write_str("system"),
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Wire body of a chat completions request.
///
/// Built once per call from the configured [`ModelOptions`]; streaming is
/// always requested.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl From<(Vec<ChatMessage>, &ModelOptions)> for ChatRequest {
    fn from((messages, options): (Vec<ChatMessage>, &ModelOptions)) -> Self {
        ChatRequest {
            model: options.model.clone(),
            messages,
            stream: true,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            repetition_penalty: options.repetition_penalty,
        }
    }
}

/// One parsed line of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment to emit as-is.
    ContentDelta { text: String },

    /// The server signalled the end of generation. Nothing after this is processed.
    Completed { reason: String },

    /// A non-blank `data:` payload that is not valid JSON.
    Malformed { line: String, error: String },
}

/// In-memory running chat history.
///
/// Each exchange appends the user input and, once streamed, the assistant's
/// accumulated reply so follow-up turns carry the whole conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    history: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a system prompt.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            history: vec![ChatMessage::system(prompt)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The history as a request message list, if there is any.
    pub fn messages(&self) -> Option<NonEmpty<ChatMessage>> {
        NonEmpty::from_vec(self.history.clone())
    }

    /// The history followed by `next`, without recording `next`.
    pub fn messages_with(&self, next: ChatMessage) -> NonEmpty<ChatMessage> {
        match NonEmpty::from_vec(self.history.clone()) {
            Some(mut messages) => {
                messages.push(next);
                messages
            }
            None => NonEmpty::new(next),
        }
    }

    /// Drop every turn, keeping a leading system prompt if there is one.
    pub fn clear(&mut self) {
        let keep = match self.history.first() {
            Some(first) if first.role == Role::System => 1,
            _ => 0,
        };
        self.history.truncate(keep);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Render the history as `role: content` lines.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .join("\n")
    }
}
