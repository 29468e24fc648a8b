use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// Accumulated output of a playground run
///
/// Streaming runs accumulate plain text; single-shot runs may return either
/// text or a full list of chat messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputContent {
    /// Plain text output
    Text(String),

    /// Structured chat messages output
    Messages(Vec<ChatMessage>),
}

impl OutputContent {
    /// Create text content
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get as plain text (if possible)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Messages(_) => None,
        }
    }

    /// Append a streamed text chunk, only meaningful for text content
    pub fn push_text(&mut self, chunk: &str) {
        if let Self::Text(s) = self {
            s.push_str(chunk);
        }
    }
}

impl From<String> for OutputContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for OutputContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
