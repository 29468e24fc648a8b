use chrono::{DateTime, Utc};
use parlay_types::{ChatMessage, OutputContent, ToolCall};
use serde::Serialize;

/// Read-only view of a run's accumulated output
///
/// Handed to the presentation layer after every mutating operation. The
/// reconciler is the only writer; consumers receive clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputSnapshot {
    /// Accumulated textual output, absent before any data arrives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<OutputContent>,

    /// Tool invocations accumulated so far, in first-seen order
    pub tool_calls: Vec<PartialToolCall>,

    /// True from run start until the terminal outcome is observed
    pub is_loading: bool,

    /// Terminal failure message, if the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Observability span recorded by the backend on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,

    /// Run timing for metadata display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<RunTiming>,
}

/// Tool call under progressive assembly
///
/// `arguments` grows by append as fragments arrive; the JSON blob is only
/// valid once the run terminates. `name` is set at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialToolCall {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub arguments: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunTiming {
    pub started_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl OutputSnapshot {
    pub(crate) fn loading() -> Self {
        Self {
            content: None,
            tool_calls: Vec::new(),
            is_loading: true,
            error: None,
            span_id: None,
            timing: Some(RunTiming {
                started_at: Utc::now(),
                finished_at: None,
            }),
        }
    }

    /// True once a terminal outcome (success or error) has been observed
    pub fn is_terminal(&self) -> bool {
        !self.is_loading
            && self
                .timing
                .map_or(false, |timing| timing.finished_at.is_some())
    }

    /// Render the accumulated output as a displayable assistant message
    ///
    /// Partial tool calls are carried over as-is; callers decide whether an
    /// incomplete arguments blob is worth showing.
    pub fn to_message(&self) -> Option<ChatMessage> {
        let content = match &self.content {
            Some(OutputContent::Text(text)) => Some(text.clone()),
            Some(OutputContent::Messages(_)) | None => None,
        };
        if content.is_none() && self.tool_calls.is_empty() {
            return None;
        }
        let tool_calls = self
            .tool_calls
            .iter()
            .map(|tc| ToolCall {
                id: tc.id.clone(),
                function: parlay_types::FunctionCall {
                    name: tc.name.clone().unwrap_or_default(),
                    arguments: tc.arguments.clone(),
                },
            })
            .collect();
        Some(ChatMessage::ai_with_tools(content, tool_calls))
    }
}
