use async_trait::async_trait;

/// Transient user-facing failure notice
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub expire_ms: Option<u64>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            expire_ms: None,
        }
    }

    pub fn with_expiry(mut self, expire_ms: u64) -> Self {
        self.expire_ms = Some(expire_ms);
        self
    }
}

/// Collaborator that surfaces run failures to the user
///
/// How the notice is rendered (toast, status line, log) is up to the
/// implementation; the driver only reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_error(&self, notification: Notification);
}

/// Default notifier that routes failures through tracing
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify_error(&self, notification: Notification) {
        tracing::error!(
            title = %notification.title,
            message = %notification.message,
            "Run failed"
        );
    }
}
