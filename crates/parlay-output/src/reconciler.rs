use chrono::Utc;
use parlay_types::{CompletionEvent, OutputContent, ToolCall, ToolCallChunk};

use crate::error::{OutputError, Result};
use crate::snapshot::{OutputSnapshot, PartialToolCall};

/// Lifecycle phase of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Failed,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Accumulates streamed or single-shot run output into an [`OutputSnapshot`]
///
/// Single-writer: one reconciler instance owns one run's snapshot at a time.
/// Events are tagged with a run id; anything tagged with a non-current run is
/// dropped without effect, which is also the cancellation mechanism (starting
/// a new run strands the previous one's events).
pub struct OutputReconciler {
    run_id: Option<String>,
    phase: RunPhase,
    snapshot: OutputSnapshot,

    // Counter for fallback keys of id-less tool call fragments
    synthesized_keys: u32,
}

impl Default for OutputReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputReconciler {
    pub fn new() -> Self {
        Self {
            run_id: None,
            phase: RunPhase::Idle,
            snapshot: OutputSnapshot::default(),
            synthesized_keys: 0,
        }
    }

    /// Id of the run currently associated with the snapshot
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Current accumulated view, read-only
    pub fn snapshot(&self) -> &OutputSnapshot {
        &self.snapshot
    }

    /// Begin a fresh run, discarding any prior snapshot
    ///
    /// Replaces an in-flight run unconditionally; events still arriving for
    /// the old run id are dropped from here on.
    pub fn start_run(&mut self, run_id: impl Into<String>) -> &OutputSnapshot {
        let run_id = run_id.into();
        if let Some(prev) = &self.run_id {
            if !self.phase.is_terminal() {
                tracing::debug!(prev_run = %prev, new_run = %run_id, "Replacing in-flight run");
            }
        }
        self.run_id = Some(run_id);
        self.phase = RunPhase::Running;
        self.snapshot = OutputSnapshot::loading();
        self.synthesized_keys = 0;
        &self.snapshot
    }

    /// Append streamed text to the accumulated content
    ///
    /// Outside of a running phase this is a no-op; the driving transport is
    /// expected not to deliver deltas after a terminal event.
    pub fn apply_text_delta(&mut self, text: &str) -> &OutputSnapshot {
        if self.phase != RunPhase::Running {
            tracing::warn!(phase = ?self.phase, "Dropping text delta outside of running phase");
            return &self.snapshot;
        }
        match &mut self.snapshot.content {
            Some(content) => content.push_text(text),
            None => self.snapshot.content = Some(OutputContent::text(text)),
        }
        &self.snapshot
    }

    /// Merge a tool call fragment into the accumulated tool calls
    ///
    /// Fragments sharing an id append their arguments to one entry; the name
    /// sticks once set. New ids are appended in first-seen order. A missing
    /// id gets a synthesized key so a malformed fragment never crashes the
    /// run, only degrades the merge.
    pub fn apply_tool_call_delta(&mut self, chunk: ToolCallChunk) -> &OutputSnapshot {
        if self.phase != RunPhase::Running {
            tracing::warn!(phase = ?self.phase, "Dropping tool call delta outside of running phase");
            return &self.snapshot;
        }

        let id = match chunk.id {
            Some(id) => id,
            None => {
                // The prefix must not look like a transport-assigned id
                // (providers use call_<n>-style ids), or an orphan fragment
                // could merge into a real call.
                let key = format!("__orphan_{}", self.synthesized_keys);
                self.synthesized_keys += 1;
                tracing::warn!(fallback_key = %key, "Tool call fragment without id");
                key
            }
        };

        if let Some(entry) = self.snapshot.tool_calls.iter_mut().find(|tc| tc.id == id) {
            if entry.name.is_none() {
                entry.name = chunk.function.name;
            }
            entry.arguments.push_str(&chunk.function.arguments);
        } else {
            self.snapshot.tool_calls.push(PartialToolCall {
                id,
                name: chunk.function.name,
                arguments: chunk.function.arguments,
            });
        }
        &self.snapshot
    }

    /// Terminal outcome of the non-streaming path: wholesale replacement
    pub fn complete_with_result(
        &mut self,
        content: Option<OutputContent>,
        tool_calls: Vec<ToolCall>,
        span_id: Option<String>,
    ) -> Result<&OutputSnapshot> {
        self.check_not_terminated()?;
        self.snapshot.content = content;
        self.snapshot.tool_calls = tool_calls
            .into_iter()
            .map(|tc| PartialToolCall {
                id: tc.id,
                name: Some(tc.function.name),
                arguments: tc.function.arguments,
            })
            .collect();
        self.snapshot.span_id = span_id;
        self.finish(RunPhase::Completed);
        Ok(&self.snapshot)
    }

    /// Successful terminal outcome of the streaming path
    ///
    /// Keeps the accumulated content/tool calls, records the span.
    pub fn finish_streaming(&mut self, span_id: Option<String>) -> Result<&OutputSnapshot> {
        self.check_not_terminated()?;
        self.snapshot.span_id = span_id;
        self.finish(RunPhase::Completed);
        Ok(&self.snapshot)
    }

    /// Failed terminal outcome; accumulated partial output is preserved
    pub fn complete_with_error(&mut self, message: impl Into<String>) -> Result<&OutputSnapshot> {
        self.check_not_terminated()?;
        self.snapshot.error = Some(message.into());
        self.finish(RunPhase::Failed);
        Ok(&self.snapshot)
    }

    /// Dispatch a run-tagged streaming event
    ///
    /// Events for a non-current run id are dropped silently and the snapshot
    /// is returned unchanged.
    pub fn apply_event(&mut self, run_id: &str, event: CompletionEvent) -> Result<&OutputSnapshot> {
        if self.run_id.as_deref() != Some(run_id) {
            tracing::debug!(stale_run = %run_id, "Dropping event for stale run");
            return Ok(&self.snapshot);
        }
        match event {
            CompletionEvent::TextChunk { content } => Ok(self.apply_text_delta(&content)),
            CompletionEvent::ToolCallChunk(chunk) => Ok(self.apply_tool_call_delta(chunk)),
            CompletionEvent::RunResult { span_id } => self.finish_streaming(span_id),
            CompletionEvent::RunError { message } => self.complete_with_error(message),
        }
    }

    fn check_not_terminated(&self) -> Result<()> {
        match self.phase {
            RunPhase::Idle => Err(OutputError::NoActiveRun),
            RunPhase::Completed | RunPhase::Failed => Err(OutputError::AlreadyTerminated {
                run_id: self.run_id.clone().unwrap_or_default(),
            }),
            RunPhase::Running => Ok(()),
        }
    }

    fn finish(&mut self, phase: RunPhase) {
        self.phase = phase;
        self.snapshot.is_loading = false;
        if let Some(timing) = &mut self.snapshot.timing {
            timing.finished_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlay_types::ToolCallChunk;

    #[test]
    fn test_start_run_resets_snapshot() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_text_delta("partial");
        let snap = rec.start_run("r2");
        assert_eq!(snap.content, None);
        assert!(snap.tool_calls.is_empty());
        assert!(snap.is_loading);
    }

    #[test]
    fn test_text_deltas_append() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_text_delta("Hello");
        let snap = rec.apply_text_delta(", world");
        assert_eq!(snap.content.as_ref().and_then(|c| c.as_text()), Some("Hello, world"));
    }

    #[test]
    fn test_tool_call_fragments_merge_by_id() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_tool_call_delta(ToolCallChunk::new("t1", "lookup", "{\"q\":"));
        let snap = rec.apply_tool_call_delta(ToolCallChunk::continuation("t1", "\"x\"}"));
        assert_eq!(snap.tool_calls.len(), 1);
        assert_eq!(snap.tool_calls[0].name.as_deref(), Some("lookup"));
        assert_eq!(snap.tool_calls[0].arguments, "{\"q\":\"x\"}");
    }

    #[test]
    fn test_tool_call_name_sticks_once_set() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_tool_call_delta(ToolCallChunk::new("t1", "lookup", "{"));
        let snap = rec.apply_tool_call_delta(ToolCallChunk::new("t1", "other", "}"));
        assert_eq!(snap.tool_calls[0].name.as_deref(), Some("lookup"));
    }

    #[test]
    fn test_interleaved_ids_keep_first_seen_order() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_tool_call_delta(ToolCallChunk::new("a", "fn_a", "1"));
        rec.apply_tool_call_delta(ToolCallChunk::new("b", "fn_b", "2"));
        rec.apply_tool_call_delta(ToolCallChunk::continuation("a", "3"));
        let snap = rec.apply_tool_call_delta(ToolCallChunk::continuation("b", "4"));
        let ids: Vec<&str> = snap.tool_calls.iter().map(|tc| tc.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(snap.tool_calls[0].arguments, "13");
        assert_eq!(snap.tool_calls[1].arguments, "24");
    }

    #[test]
    fn test_missing_id_gets_fallback_key() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        let chunk = ToolCallChunk {
            id: None,
            function: parlay_types::FunctionChunk {
                name: Some("orphan".to_string()),
                arguments: "{}".to_string(),
            },
        };
        let snap = rec.apply_tool_call_delta(chunk);
        assert_eq!(snap.tool_calls[0].id, "__orphan_0");
    }

    #[test]
    fn test_fallback_key_does_not_collide_with_real_ids() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_tool_call_delta(ToolCallChunk::new("call_0", "real", "{\"a\":1}"));
        let chunk = ToolCallChunk {
            id: None,
            function: parlay_types::FunctionChunk {
                name: Some("orphan".to_string()),
                arguments: "{}".to_string(),
            },
        };
        let snap = rec.apply_tool_call_delta(chunk);
        assert_eq!(snap.tool_calls.len(), 2);
        assert_eq!(snap.tool_calls[0].id, "call_0");
        assert_eq!(snap.tool_calls[0].arguments, "{\"a\":1}");
        assert_eq!(snap.tool_calls[1].id, "__orphan_0");
    }

    #[test]
    fn test_stale_run_event_is_dropped() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.start_run("r2");
        let snap = rec
            .apply_event(
                "r1",
                CompletionEvent::TextChunk {
                    content: "late".to_string(),
                },
            )
            .unwrap();
        assert_eq!(snap.content, None);
        assert!(snap.is_loading);
    }

    #[test]
    fn test_second_terminal_call_is_rejected() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.complete_with_error("boom").unwrap();
        let err = rec.complete_with_result(None, vec![], None).unwrap_err();
        assert!(matches!(err, OutputError::AlreadyTerminated { .. }));
    }

    #[test]
    fn test_terminal_before_start_is_rejected() {
        let mut rec = OutputReconciler::new();
        let err = rec.complete_with_error("boom").unwrap_err();
        assert!(matches!(err, OutputError::NoActiveRun));
    }

    #[test]
    fn test_deltas_after_terminal_are_noops() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_text_delta("done");
        rec.finish_streaming(None).unwrap();
        let snap = rec.apply_text_delta("late").clone();
        assert_eq!(snap.content.as_ref().and_then(|c| c.as_text()), Some("done"));
        assert!(!snap.is_loading);
        let snap = rec.apply_tool_call_delta(ToolCallChunk::new("t", "f", "{}"));
        assert!(snap.tool_calls.is_empty());
    }

    #[test]
    fn test_error_preserves_partial_output() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_tool_call_delta(ToolCallChunk::new("t1", "lookup", "{\"q\":"));
        rec.apply_tool_call_delta(ToolCallChunk::continuation("t1", "\"x\"}"));
        let snap = rec.complete_with_error("boom").unwrap();
        assert_eq!(snap.content, None);
        assert_eq!(snap.tool_calls.len(), 1);
        assert_eq!(snap.tool_calls[0].arguments, "{\"q\":\"x\"}");
        assert!(!snap.is_loading);
        assert_eq!(snap.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_single_shot_replaces_wholesale() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_text_delta("stream leftovers");
        let snap = rec
            .complete_with_result(
                Some(OutputContent::text("Hello, world")),
                vec![],
                Some("span1".to_string()),
            )
            .unwrap();
        assert_eq!(snap.content.as_ref().and_then(|c| c.as_text()), Some("Hello, world"));
        assert!(snap.tool_calls.is_empty());
        assert!(!snap.is_loading);
        assert_eq!(snap.span_id.as_deref(), Some("span1"));
    }

    #[test]
    fn test_run_succeeded_event_keeps_accumulated_output() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.apply_event(
            "r1",
            CompletionEvent::TextChunk {
                content: "Hi".to_string(),
            },
        )
        .unwrap();
        let snap = rec
            .apply_event(
                "r1",
                CompletionEvent::RunResult {
                    span_id: Some("span9".to_string()),
                },
            )
            .unwrap();
        assert_eq!(snap.content.as_ref().and_then(|c| c.as_text()), Some("Hi"));
        assert_eq!(snap.span_id.as_deref(), Some("span9"));
        assert!(snap.is_terminal());
    }

    #[test]
    fn test_new_run_after_terminal_loads_again() {
        let mut rec = OutputReconciler::new();
        rec.start_run("r1");
        rec.complete_with_error("boom").unwrap();
        let snap = rec.start_run("r2");
        assert!(snap.is_loading);
        assert_eq!(snap.error, None);
        assert_eq!(rec.phase(), RunPhase::Running);
    }
}
