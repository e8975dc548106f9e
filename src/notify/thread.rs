//! In-process dispatcher: one sleeper thread per pending reminder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::{deliver, Dispatcher, NotificationId, Notifier, ReminderPayload, TaskHandle};
use crate::error::DispatchError;

/// Set once a reminder has been delivered or closed.
type Gate = Arc<Mutex<bool>>;

struct PendingTimer {
    generation: u64,
    gate: Gate,
    // Dropping the sender wakes the sleeper, which then exits quietly.
    _wake: Sender<()>,
}

impl PendingTimer {
    /// Shut the gate. Blocks while this reminder is being delivered.
    fn close(self) {
        *lock(&self.gate) = true;
    }
}

type PendingMap = Arc<Mutex<HashMap<NotificationId, PendingTimer>>>;

/// Fires reminders from background threads of this process.
///
/// A timer fires only while it is still the registered generation for its
/// id. Delivery happens under that reminder's own gate, not under the map
/// lock, so a slow notifier holds up nothing but a cancel of the same
/// reminder. Once `cancel` returns the reminder cannot fire. A notifier must
/// not cancel or replace the reminder it is delivering.
///
/// Dropping the dispatcher cancels everything still pending.
pub struct ThreadDispatcher {
    notifier: Arc<dyn Notifier>,
    pending: PendingMap,
    next_generation: AtomicU64,
}

impl ThreadDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Drop every pending reminder.
    pub fn cancel_all(&self) {
        let timers: Vec<PendingTimer> = lock(&self.pending).drain().map(|(_, t)| t).collect();
        if !timers.is_empty() {
            tracing::debug!(count = timers.len(), "cancelling pending reminders");
        }
        for timer in timers {
            timer.close();
        }
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn fire(
    pending: &PendingMap,
    gate: &Gate,
    generation: u64,
    notifier: &dyn Notifier,
    payload: &ReminderPayload,
) {
    let id = &payload.notification_id;
    let mut done = lock(gate);
    if *done {
        return;
    }
    let current = lock(pending)
        .get(id)
        .is_some_and(|t| t.generation == generation);
    if !current {
        return;
    }
    *done = true;

    tracing::info!(
        notification_id = %id,
        batch_id = %payload.batch_id,
        "reminder fired"
    );
    deliver(notifier, payload);
    drop(done);

    let mut map = lock(pending);
    if map.get(id).is_some_and(|t| t.generation == generation) {
        map.remove(id);
    }
}

impl Dispatcher for ThreadDispatcher {
    fn schedule_once(
        &self,
        delay: Duration,
        payload: ReminderPayload,
    ) -> Result<TaskHandle, DispatchError> {
        let id = payload.notification_id.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let (wake, sleeper) = mpsc::channel::<()>();
        let gate: Gate = Arc::new(Mutex::new(false));

        let pending = Arc::clone(&self.pending);
        let notifier = Arc::clone(&self.notifier);
        let timer_gate = Arc::clone(&gate);

        let replaced = {
            // Hold the lock across spawn so the timer cannot observe the map
            // before its own entry is in place.
            let mut map = lock(&self.pending);
            thread::Builder::new()
                .name(format!("reminder-{id}"))
                .spawn(move || {
                    if matches!(sleeper.recv_timeout(delay), Err(RecvTimeoutError::Timeout)) {
                        fire(&pending, &timer_gate, generation, notifier.as_ref(), &payload);
                    }
                })
                .map_err(|e| {
                    DispatchError::Unavailable(format!("failed to spawn timer thread: {e}"))
                })?;

            map.insert(
                id.clone(),
                PendingTimer {
                    generation,
                    gate,
                    _wake: wake,
                },
            )
        };
        if let Some(old) = replaced {
            old.close();
        }

        Ok(TaskHandle::for_notification(id))
    }

    fn cancel(&self, handle: &TaskHandle) -> Result<(), DispatchError> {
        let timer = lock(&self.pending).remove(handle.notification_id());
        if let Some(timer) = timer {
            timer.close();
        }
        Ok(())
    }
}
