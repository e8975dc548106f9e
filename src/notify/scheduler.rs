use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Dispatcher, NotificationId, ReminderPayload, TaskHandle};
use crate::error::DispatchError;
use crate::models::{Batch, Stage, StageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled {
        notification_id: NotificationId,
        delay: Duration,
    },
    /// Planned end is now or in the past; nothing was dispatched.
    AlreadyDue,
    /// Stage has no planned end.
    Unplanned,
}

/// Translates planned stage ends into dispatcher requests.
pub struct NotificationScheduler {
    dispatcher: Arc<dyn Dispatcher>,
    handles: Mutex<HashMap<NotificationId, TaskHandle>>,
}

impl NotificationScheduler {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Request a reminder at the stage's planned end.
    ///
    /// Never dispatches retroactively: a planned end at or before `now` is a
    /// no-op. Scheduling the same stage again replaces the earlier request.
    pub fn schedule(
        &self,
        stage: &Stage,
        batch: &Batch,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, DispatchError> {
        let Some(planned_end) = stage.planned_end_time else {
            return Ok(ScheduleOutcome::Unplanned);
        };

        let delay = match planned_end.signed_duration_since(now).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            _ => {
                tracing::debug!(stage_id = %stage.id, "planned end already passed, not scheduling");
                return Ok(ScheduleOutcome::AlreadyDue);
            }
        };

        let payload = ReminderPayload::new(stage, batch);
        let notification_id = payload.notification_id.clone();
        let handle = self.dispatcher.schedule_once(delay, payload)?;

        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(notification_id.clone(), handle);

        tracing::info!(
            stage_id = %stage.id,
            batch_id = %batch.id,
            notification_id = %notification_id,
            delay_secs = delay.as_secs(),
            "scheduled stage reminder"
        );

        Ok(ScheduleOutcome::Scheduled {
            notification_id,
            delay,
        })
    }

    /// Cancel the stage's pending reminder, if any.
    ///
    /// Works for reminders scheduled by another process too, since the
    /// handle is derived from the stage id.
    pub fn cancel(&self, stage_id: &StageId) -> Result<(), DispatchError> {
        let notification_id = NotificationId::for_stage(stage_id);
        let handle = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&notification_id)
            .unwrap_or_else(|| TaskHandle::for_notification(notification_id.clone()));

        self.dispatcher.cancel(&handle)?;
        tracing::debug!(stage_id = %stage_id, notification_id = %notification_id, "cancelled stage reminder");
        Ok(())
    }
}
