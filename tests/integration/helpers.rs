//! Shared test helpers for lifecycle integration tests

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferment::clock::ManualClock;
use ferment::error::DispatchError;
use ferment::lifecycle::{LifecycleController, NewBatch};
use ferment::models::StageId;
use ferment::notify::{Dispatcher, NotificationId, ReminderPayload, TaskHandle};
use ferment::planner::StageTemplate;
use ferment::store::Store;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

/// Dispatcher that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingDispatcher {
    pending: Mutex<HashMap<NotificationId, (Duration, ReminderPayload)>>,
    requests: Mutex<usize>,
}

impl RecordingDispatcher {
    pub fn pending_delay(&self, stage: &StageId) -> Option<Duration> {
        self.pending
            .lock()
            .unwrap()
            .get(&NotificationId::for_stage(stage))
            .map(|(delay, _)| *delay)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn schedule_once(
        &self,
        delay: Duration,
        payload: ReminderPayload,
    ) -> Result<TaskHandle, DispatchError> {
        let id = payload.notification_id.clone();
        self.pending
            .lock()
            .unwrap()
            .insert(id.clone(), (delay, payload));
        *self.requests.lock().unwrap() += 1;
        Ok(TaskHandle::for_notification(id))
    }

    fn cancel(&self, handle: &TaskHandle) -> Result<(), DispatchError> {
        self.pending.lock().unwrap().remove(handle.notification_id());
        Ok(())
    }
}

pub struct Engine {
    pub controller: LifecycleController,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub clock: Arc<ManualClock>,
}

/// Controller over `store` with a recording dispatcher and a clock at `t0()`.
pub fn engine(store: Arc<dyn Store>) -> Engine {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let controller = LifecycleController::new(store, dispatcher.clone(), clock.clone());
    Engine {
        controller,
        dispatcher,
        clock,
    }
}

pub fn batch_a() -> NewBatch {
    NewBatch {
        name: "Batch-A".to_string(),
        product_type: "salami".to_string(),
        start: Some(t0()),
        stages: vec![
            StageTemplate::new("Fermentation", 36),
            StageTemplate::new("Drying", 336),
        ],
        ..NewBatch::default()
    }
}
