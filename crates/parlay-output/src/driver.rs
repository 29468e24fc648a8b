use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use parlay_types::{CompletionEvent, CompletionPayload};

use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::reconciler::OutputReconciler;
use crate::snapshot::OutputSnapshot;
use crate::store::SnapshotStore;

/// Event stream delivered by the subscription transport
pub type EventStream = Pin<Box<dyn Stream<Item = anyhow::Result<CompletionEvent>> + Send>>;

const BACKEND_ERROR_TITLE: &str = "Chat completion failed";
const TRANSPORT_ERROR_TITLE: &str = "Failed to get output";
const ERROR_NOTIFICATION_EXPIRE_MS: u64 = 10_000;

/// Drives one run at a time from a transport into the snapshot store
///
/// Owns the reconciler, which keeps mutation single-writer: a run is consumed
/// to its terminal event (or transport failure) before the driver can start
/// another, and dropping the event stream at that point is the subscription
/// teardown.
pub struct RunDriver {
    reconciler: OutputReconciler,
    store: SnapshotStore,
    notifier: Arc<dyn Notifier>,
}

impl RunDriver {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reconciler: OutputReconciler::new(),
            store: SnapshotStore::new(),
            notifier,
        }
    }

    /// Store handle for presentation-layer subscriptions
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Latest reconciled snapshot
    pub fn snapshot(&self) -> &OutputSnapshot {
        self.reconciler.snapshot()
    }

    /// Consume a streaming run to its terminal outcome
    ///
    /// Each event is reconciled and published. A transport error fails the
    /// run; the transport is never retried from here. A stream that closes
    /// without a terminal event is treated as normal completion, keeping
    /// whatever was accumulated.
    pub async fn run_streaming(
        &mut self,
        run_id: impl Into<String>,
        mut events: EventStream,
    ) -> Result<OutputSnapshot> {
        let run_id = run_id.into();
        self.reconciler.start_run(run_id.clone());
        self.store.publish(self.reconciler.snapshot().clone());

        let mut terminated = false;
        while let Some(event_result) = events.next().await {
            match event_result {
                Ok(event) => {
                    let is_terminal = matches!(
                        event,
                        CompletionEvent::RunResult { .. } | CompletionEvent::RunError { .. }
                    );
                    if let CompletionEvent::RunError { message } = &event {
                        self.notifier
                            .notify_error(
                                Notification::new(BACKEND_ERROR_TITLE, message.clone())
                                    .with_expiry(ERROR_NOTIFICATION_EXPIRE_MS),
                            )
                            .await;
                    }
                    self.reconciler.apply_event(&run_id, event)?;
                    self.store.publish(self.reconciler.snapshot().clone());
                    if is_terminal {
                        terminated = true;
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(run_id = %run_id, error = %e, "Streaming transport failed");
                    self.fail_run(TRANSPORT_ERROR_TITLE, "Please try again.")
                        .await?;
                    terminated = true;
                    break;
                }
            }
        }

        if !terminated {
            tracing::debug!(run_id = %run_id, "Stream closed without a terminal event");
            self.reconciler.finish_streaming(None)?;
            self.store.publish(self.reconciler.snapshot().clone());
        }

        // Dropping `events` here tears the subscription down.
        Ok(self.reconciler.snapshot().clone())
    }

    /// Apply the single-shot (request/response) outcome of a run
    pub async fn run_single_shot(
        &mut self,
        run_id: impl Into<String>,
        response: anyhow::Result<CompletionPayload>,
    ) -> Result<OutputSnapshot> {
        self.reconciler.start_run(run_id);
        self.store.publish(self.reconciler.snapshot().clone());

        match response {
            Ok(payload) => {
                if let Some(message) = payload.error_message {
                    self.fail_run(BACKEND_ERROR_TITLE, &message).await?;
                } else {
                    self.reconciler.complete_with_result(
                        payload.content,
                        payload.tool_calls,
                        payload.span_id,
                    )?;
                    self.store.publish(self.reconciler.snapshot().clone());
                }
            }
            Err(e) => {
                self.fail_run(TRANSPORT_ERROR_TITLE, &e.to_string()).await?;
            }
        }

        Ok(self.reconciler.snapshot().clone())
    }

    async fn fail_run(&mut self, title: &str, message: &str) -> Result<()> {
        self.reconciler.complete_with_error(message)?;
        self.store.publish(self.reconciler.snapshot().clone());
        self.notifier
            .notify_error(Notification::new(title, message).with_expiry(ERROR_NOTIFICATION_EXPIRE_MS))
            .await;
        Ok(())
    }
}
