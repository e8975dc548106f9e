//! Stage-completion reminders.
//!
//! The lifecycle controller talks to a [`NotificationScheduler`], which turns
//! a stage's planned end into a one-shot request on a [`Dispatcher`]. When a
//! request fires, the dispatcher hands it to a [`Notifier`] for display.

mod queue;
mod scheduler;
mod terminal;
mod thread;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

use crate::error::DispatchError;
use crate::models::{Batch, BatchId, Stage, StageId};

pub use queue::{QueueDispatcher, QueuedReminder};
pub use scheduler::{NotificationScheduler, ScheduleOutcome};
pub use terminal::TerminalNotifier;
pub use thread::ThreadDispatcher;

/// Stable id of the reminder for one stage.
///
/// First 8 bytes of SHA-256 over the stage id, hex encoded, so every process
/// derives the same id for the same stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn for_stage(stage_id: &StageId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(stage_id.as_str().as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a reminder carries, captured when it is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub notification_id: NotificationId,
    pub stage_id: StageId,
    pub stage_name: String,
    pub batch_id: BatchId,
    pub batch_name: String,
}

impl ReminderPayload {
    pub fn new(stage: &Stage, batch: &Batch) -> Self {
        Self {
            notification_id: NotificationId::for_stage(&stage.id),
            stage_id: stage.id.clone(),
            stage_name: stage.name.clone(),
            batch_id: batch.id.clone(),
            batch_name: batch.name.clone(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} finished", self.stage_name)
    }

    pub fn body(&self) -> String {
        format!(
            "Batch {}: stage {} reached its planned end",
            self.batch_name, self.stage_name
        )
    }
}

/// Handle to a pending one-shot request.
///
/// Handles are keyed by notification id: a new request for the same id
/// replaces the pending one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(NotificationId);

impl TaskHandle {
    pub fn for_notification(id: NotificationId) -> Self {
        Self(id)
    }

    pub fn notification_id(&self) -> &NotificationId {
        &self.0
    }
}

/// Deferred one-shot execution.
pub trait Dispatcher: Send + Sync {
    /// Fire `payload` once after `delay`, replacing any pending request with
    /// the same notification id.
    fn schedule_once(
        &self,
        delay: Duration,
        payload: ReminderPayload,
    ) -> Result<TaskHandle, DispatchError>;

    /// Drop a pending request. Unknown handles are a no-op. Once this returns
    /// the request can no longer fire.
    fn cancel(&self, handle: &TaskHandle) -> Result<(), DispatchError>;
}

/// Presents a fired reminder to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, notification_id: &NotificationId, batch_id: &BatchId);
}

/// Hand a fired reminder to `notifier`.
pub fn deliver(notifier: &dyn Notifier, payload: &ReminderPayload) {
    notifier.notify(
        &payload.title(),
        &payload.body(),
        &payload.notification_id,
        &payload.batch_id,
    );
}
