//! Durable dispatcher backed by a YAML queue file.
//!
//! Short-lived CLI invocations enqueue reminders here; a long-running
//! `ferment watch` drains whatever has come due. All access goes through an
//! exclusive file lock.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{Dispatcher, ReminderPayload, TaskHandle};
use crate::clock::Clock;
use crate::error::DispatchError;
use crate::store::{locked_read, locked_update};

pub const QUEUE_FILE_NAME: &str = "reminders.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedReminder {
    pub due_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: ReminderPayload,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    #[serde(default)]
    reminders: Vec<QueuedReminder>,
}

impl QueueFile {
    fn parse(content: &str) -> Result<Self, DispatchError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn render(&self) -> Result<String, DispatchError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub struct QueueDispatcher {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl QueueDispatcher {
    /// Queue stored as `reminders.yaml` inside `data_dir`.
    pub fn open(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self, DispatchError> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(QUEUE_FILE_NAME),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything queued, soonest first.
    pub fn pending(&self) -> Result<Vec<QueuedReminder>, DispatchError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reminders = QueueFile::parse(&locked_read(&self.path)?)?.reminders;
        reminders.sort_by_key(|r| r.due_at);
        Ok(reminders)
    }

    /// Remove and return every reminder due at or before `now`, soonest first.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ReminderPayload>, DispatchError> {
        let mut due = Vec::new();
        locked_update(&self.path, |content| -> Result<String, DispatchError> {
            let mut queue = QueueFile::parse(content)?;
            let (ready, waiting): (Vec<_>, Vec<_>) =
                queue.reminders.into_iter().partition(|r| r.due_at <= now);
            queue.reminders = waiting;
            due = ready;
            queue.render()
        })?;
        due.sort_by_key(|r| r.due_at);
        Ok(due.into_iter().map(|r| r.payload).collect())
    }

    fn modify(&self, f: impl FnOnce(&mut Vec<QueuedReminder>)) -> Result<(), DispatchError> {
        locked_update(&self.path, |content| -> Result<String, DispatchError> {
            let mut queue = QueueFile::parse(content)?;
            f(&mut queue.reminders);
            queue.render()
        })
    }
}

impl Dispatcher for QueueDispatcher {
    fn schedule_once(
        &self,
        delay: Duration,
        payload: ReminderPayload,
    ) -> Result<TaskHandle, DispatchError> {
        let delay = ChronoDuration::from_std(delay)
            .map_err(|e| DispatchError::Unavailable(format!("delay out of range: {e}")))?;
        let due_at = self.clock.now() + delay;
        let handle = TaskHandle::for_notification(payload.notification_id.clone());

        self.modify(|reminders| {
            reminders.retain(|r| r.payload.notification_id != payload.notification_id);
            reminders.push(QueuedReminder { due_at, payload });
        })?;

        Ok(handle)
    }

    fn cancel(&self, handle: &TaskHandle) -> Result<(), DispatchError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|reminders| {
            reminders.retain(|r| &r.payload.notification_id != handle.notification_id());
        })
    }
}
