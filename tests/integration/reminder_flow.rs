//! Reminder delivery through the real dispatchers

use chrono::Duration;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use ferment::clock::{Clock, ManualClock};
use ferment::lifecycle::{LifecycleController, ReminderOutcome};
use ferment::models::BatchId;
use ferment::notify::{
    Dispatcher, NotificationId, Notifier, QueueDispatcher, ThreadDispatcher,
};
use ferment::store::InMemoryStore;

use super::helpers::{batch_a, t0};

#[derive(Default)]
struct CollectingNotifier {
    titles: Mutex<Vec<String>>,
}

impl Notifier for CollectingNotifier {
    fn notify(&self, title: &str, _body: &str, _id: &NotificationId, _batch: &BatchId) {
        self.titles.lock().unwrap().push(title.to_string());
    }
}

fn controller_with(
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<ManualClock>,
) -> LifecycleController {
    LifecycleController::new(Arc::new(InMemoryStore::new()), dispatcher, clock)
}

#[test]
fn test_queue_holds_reminder_until_due() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let queue = Arc::new(QueueDispatcher::open(temp.path(), clock.clone()).unwrap());
    let controller = controller_with(queue.clone(), clock.clone());

    let overview = controller.create_batch(batch_a()).unwrap();
    let first = &overview.stages[0];
    let started = controller.start_stage(&first.id).unwrap();
    assert!(matches!(started.reminder, ReminderOutcome::Scheduled { .. }));

    let pending = queue.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].due_at, t0() + Duration::hours(36));
    assert_eq!(pending[0].payload.notification_id, NotificationId::for_stage(&first.id));

    assert!(queue.take_due(clock.now() + Duration::hours(35)).unwrap().is_empty());

    let due = queue.take_due(clock.now() + Duration::hours(36)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].stage_name, "Fermentation");
    assert!(queue.pending().unwrap().is_empty());
}

#[test]
fn test_queue_entry_removed_on_complete() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let queue = Arc::new(QueueDispatcher::open(temp.path(), clock.clone()).unwrap());
    let controller = controller_with(queue.clone(), clock.clone());

    let overview = controller.create_batch(batch_a()).unwrap();
    controller.start_stage(&overview.stages[0].id).unwrap();
    clock.advance(Duration::hours(20));

    let done = controller.complete_stage(&overview.stages[0].id).unwrap();

    assert!(matches!(done.reminder, ReminderOutcome::Cancelled));
    assert!(queue.pending().unwrap().is_empty());
    assert!(queue.take_due(t0() + Duration::days(60)).unwrap().is_empty());
}

#[test]
fn test_rearm_restores_lost_queue() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let queue = Arc::new(QueueDispatcher::open(temp.path(), clock.clone()).unwrap());
    let controller = controller_with(queue.clone(), clock.clone());

    let overview = controller.create_batch(batch_a()).unwrap();
    controller.start_stage(&overview.stages[0].id).unwrap();
    std::fs::remove_file(queue.path()).unwrap();

    clock.advance(Duration::hours(6));
    assert_eq!(controller.rearm_reminders().unwrap(), 1);

    let pending = queue.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].due_at, t0() + Duration::hours(36));
}

#[test]
fn test_thread_dispatcher_cancelled_on_complete() {
    let clock = Arc::new(ManualClock::new(t0()));
    let notifier = Arc::new(CollectingNotifier::default());
    let threads = Arc::new(ThreadDispatcher::new(notifier.clone()));
    let controller = controller_with(threads.clone(), clock.clone());

    let overview = controller.create_batch(batch_a()).unwrap();
    controller.start_stage(&overview.stages[0].id).unwrap();
    assert_eq!(threads.pending_count(), 1);

    clock.advance(Duration::hours(1));
    controller.complete_stage(&overview.stages[0].id).unwrap();

    assert_eq!(threads.pending_count(), 0);
    assert!(notifier.titles.lock().unwrap().is_empty());
}
