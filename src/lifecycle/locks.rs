use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::BatchId;

/// One mutex per batch id.
///
/// Mutations on the same batch run one at a time; different batches do not
/// contend beyond the short lookup in the registry. The guarded data lives in
/// the store, so a poisoned mutex is simply taken over.
#[derive(Default)]
pub struct BatchLocks {
    locks: Mutex<HashMap<BatchId, Arc<Mutex<()>>>>,
}

impl BatchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `batch_id`.
    pub fn with_batch<T>(&self, batch_id: &BatchId, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(batch_id.clone()).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }

    /// Drop the registry entry of a deleted batch.
    pub fn forget(&self, batch_id: &BatchId) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(batch_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_batch_is_serialized() {
        let locks = Arc::new(BatchLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let batch = BatchId::from("batch-a");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_seen, batch) =
                    (locks.clone(), inside.clone(), max_seen.clone(), batch.clone());
                thread::spawn(move || {
                    locks.with_batch(&batch, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_different_batches_do_not_block() {
        let locks = BatchLocks::new();
        let a = BatchId::from("a");
        let b = BatchId::from("b");

        let value = locks.with_batch(&a, || locks.with_batch(&b, || 42));
        assert_eq!(value, 42);
        assert_eq!(locks.len(), 2);

        locks.forget(&a);
        assert_eq!(locks.len(), 1);
    }
}
