//! Persistence port.
//!
//! The engine only talks to storage through [`Store`]. A batch exclusively
//! owns its stages and logs: deleting a batch removes them too.

mod file;
mod frontmatter;
mod locking;
mod memory;
mod serialization;

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::StoreError;
use crate::models::{Batch, BatchId, BatchLog, Stage, StageId, StageStatus};

pub use file::FileStore;
pub use locking::{locked_read, locked_update};
pub use memory::InMemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait Store: Send + Sync {
    fn insert_batch(&self, batch: &Batch) -> StoreResult<()>;
    fn update_batch(&self, batch: &Batch) -> StoreResult<()>;
    /// Delete a batch with its stages and logs. Returns false if it did not exist.
    fn delete_batch(&self, id: &BatchId) -> StoreResult<bool>;
    fn batch(&self, id: &BatchId) -> StoreResult<Option<Batch>>;
    fn batch_by_scan_code(&self, scan_code: &str) -> StoreResult<Option<Batch>>;
    fn batches(&self) -> StoreResult<Vec<Batch>>;

    fn insert_stage(&self, stage: &Stage) -> StoreResult<()>;
    fn update_stage(&self, stage: &Stage) -> StoreResult<()>;
    fn delete_stage(&self, id: &StageId) -> StoreResult<bool>;
    fn stage(&self, id: &StageId) -> StoreResult<Option<Stage>>;
    /// Stages of a batch ordered by `order_index`.
    fn stages_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<Stage>>;
    fn all_stages(&self) -> StoreResult<Vec<Stage>>;

    fn insert_log(&self, log: &BatchLog) -> StoreResult<()>;
    /// Logs of a batch ordered by timestamp.
    fn logs_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<BatchLog>>;

    fn count_active_batches(&self) -> StoreResult<usize> {
        Ok(self.batches()?.iter().filter(|b| b.active).count())
    }

    /// Number of stages whose actual end falls in `[since, now]`.
    fn count_stages_completed_between(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<usize> {
        Ok(self
            .all_stages()?
            .iter()
            .filter_map(|s| s.end_time)
            .filter(|end| *end >= since && *end <= now)
            .count())
    }

    /// Unfinished stage of an active batch with the earliest planned end
    /// strictly after `now`.
    fn next_planned_end_after(&self, now: DateTime<Utc>) -> StoreResult<Option<Stage>> {
        let active: HashSet<BatchId> = self
            .batches()?
            .into_iter()
            .filter(|b| b.active)
            .map(|b| b.id)
            .collect();
        Ok(self
            .all_stages()?
            .into_iter()
            .filter(|s| active.contains(&s.batch_id))
            .filter(|s| s.status() != StageStatus::Completed)
            .filter(|s| s.planned_end_time.is_some_and(|end| end > now))
            .min_by_key(|s| s.planned_end_time))
    }

    /// Up to `limit` completed stages, most recently ended first.
    fn recently_completed_stages(&self, limit: usize) -> StoreResult<Vec<Stage>> {
        let mut completed: Vec<Stage> = self
            .all_stages()?
            .into_iter()
            .filter(|s| s.status() == StageStatus::Completed)
            .collect();
        completed.sort_by(|a, b| b.end_time.cmp(&a.end_time));
        completed.truncate(limit);
        Ok(completed)
    }
}

fn sort_stages(stages: &mut [Stage]) {
    stages.sort_by_key(|s| s.order_index);
}

fn sort_logs(logs: &mut [BatchLog]) {
    logs.sort_by_key(|l| l.timestamp);
}

#[cfg(test)]
mod tests;
