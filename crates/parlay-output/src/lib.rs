pub mod driver;
pub mod error;
pub mod notify;
pub mod reconciler;
pub mod snapshot;
pub mod store;

pub use driver::{EventStream, RunDriver};
pub use error::{OutputError, Result};
pub use notify::{Notification, Notifier, TracingNotifier};
pub use reconciler::{OutputReconciler, RunPhase};
pub use snapshot::{OutputSnapshot, PartialToolCall, RunTiming};
pub use store::SnapshotStore;
