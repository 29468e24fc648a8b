use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

/// Role of a chat message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,

    User,

    #[serde(rename = "ai")]
    Ai,

    Tool,
}

/// A single chat message as displayed in a playground conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,

    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    /// Create an AI message with text content
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role: Role::Ai,
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Create an AI message carrying tool calls
    pub fn ai_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: generate_message_id(),
            role: Role::Ai,
            content,
            tool_calls,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role: Role::User,
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Get role as string
    pub fn role_str(&self) -> &str {
        match self.role {
            Role::System => "system",
            Role::User => "user",
            Role::Ai => "ai",
            Role::Tool => "tool",
        }
    }
}

/// Generate a unique message id for synthesized display messages
pub fn generate_message_id() -> String {
    format!("msg_{}", uuid::Uuid::new_v4())
}
