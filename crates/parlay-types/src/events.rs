use serde::{Deserialize, Serialize};

use crate::content::OutputContent;
use crate::tool::ToolCall;

/// Streaming event for a playground run
///
/// This is the canonical event union delivered by the subscription transport,
/// one variant per chunk kind plus the two terminal outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionEvent {
    /// Incremental text output (streamed token-by-token)
    TextChunk {
        content: String,
    },

    /// Incremental tool call fragment (streamed incrementally)
    ToolCallChunk(ToolCallChunk),

    /// Run finished successfully; carries the span recorded by the backend
    RunResult {
        #[serde(skip_serializing_if = "Option::is_none")]
        span_id: Option<String>,
    },

    /// Run failed on the backend
    RunError {
        message: String,
    },
}

/// Partial tool call fragment
///
/// `id` keys the merge; `arguments` is an append-only piece of a JSON blob
/// that is only valid once the run terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub function: FunctionChunk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub arguments: String,
}

impl ToolCallChunk {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            function: FunctionChunk {
                name: Some(name.into()),
                arguments: arguments.into(),
            },
        }
    }

    /// Continuation fragment for an already-announced call
    pub fn continuation(id: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            function: FunctionChunk {
                name: None,
                arguments: arguments.into(),
            },
        }
    }
}

/// Terminal payload of the non-streaming (request/response) path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<OutputContent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CompletionPayload {
    pub fn success(content: Option<OutputContent>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content,
            tool_calls,
            span_id: None,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: None,
            tool_calls: Vec::new(),
            span_id: None,
            error_message: Some(message.into()),
        }
    }

    pub fn with_span(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}
