//! In-memory store for tests and embedding.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{sort_logs, sort_stages, Store, StoreResult};
use crate::error::StoreError;
use crate::models::{Batch, BatchId, BatchLog, Stage, StageId};

#[derive(Default)]
struct Tables {
    batches: HashMap<BatchId, Batch>,
    stages: HashMap<StageId, Stage>,
    logs: Vec<BatchLog>,
}

/// All tables live behind one lock so a cascade delete is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }
}

impl Store for InMemoryStore {
    fn insert_batch(&self, batch: &Batch) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.batches.contains_key(&batch.id) {
            return Err(StoreError::Conflict(format!("batch {}", batch.id)));
        }
        tables.batches.insert(batch.id.clone(), batch.clone());
        Ok(())
    }

    fn update_batch(&self, batch: &Batch) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.batches.get_mut(&batch.id) {
            Some(existing) => {
                *existing = batch.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("batch {}", batch.id))),
        }
    }

    fn delete_batch(&self, id: &BatchId) -> StoreResult<bool> {
        let mut tables = self.write()?;
        let removed = tables.batches.remove(id).is_some();
        if removed {
            tables.stages.retain(|_, s| &s.batch_id != id);
            tables.logs.retain(|l| &l.batch_id != id);
        }
        Ok(removed)
    }

    fn batch(&self, id: &BatchId) -> StoreResult<Option<Batch>> {
        Ok(self.read()?.batches.get(id).cloned())
    }

    fn batch_by_scan_code(&self, scan_code: &str) -> StoreResult<Option<Batch>> {
        Ok(self
            .read()?
            .batches
            .values()
            .find(|b| b.scan_code.as_deref() == Some(scan_code))
            .cloned())
    }

    fn batches(&self) -> StoreResult<Vec<Batch>> {
        let mut batches: Vec<Batch> = self.read()?.batches.values().cloned().collect();
        batches.sort_by_key(|b| b.start_date);
        Ok(batches)
    }

    fn insert_stage(&self, stage: &Stage) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.batches.contains_key(&stage.batch_id) {
            return Err(StoreError::Missing(format!("batch {}", stage.batch_id)));
        }
        if tables.stages.contains_key(&stage.id) {
            return Err(StoreError::Conflict(format!("stage {}", stage.id)));
        }
        tables.stages.insert(stage.id.clone(), stage.clone());
        Ok(())
    }

    fn update_stage(&self, stage: &Stage) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.stages.get_mut(&stage.id) {
            Some(existing) => {
                *existing = stage.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("stage {}", stage.id))),
        }
    }

    fn delete_stage(&self, id: &StageId) -> StoreResult<bool> {
        Ok(self.write()?.stages.remove(id).is_some())
    }

    fn stage(&self, id: &StageId) -> StoreResult<Option<Stage>> {
        Ok(self.read()?.stages.get(id).cloned())
    }

    fn stages_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<Stage>> {
        let mut stages: Vec<Stage> = self
            .read()?
            .stages
            .values()
            .filter(|s| &s.batch_id == batch_id)
            .cloned()
            .collect();
        sort_stages(&mut stages);
        Ok(stages)
    }

    fn all_stages(&self) -> StoreResult<Vec<Stage>> {
        Ok(self.read()?.stages.values().cloned().collect())
    }

    fn insert_log(&self, log: &BatchLog) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.batches.contains_key(&log.batch_id) {
            return Err(StoreError::Missing(format!("batch {}", log.batch_id)));
        }
        tables.logs.push(log.clone());
        Ok(())
    }

    fn logs_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<BatchLog>> {
        let mut logs: Vec<BatchLog> = self
            .read()?
            .logs
            .iter()
            .filter(|l| &l.batch_id == batch_id)
            .cloned()
            .collect();
        sort_logs(&mut logs);
        Ok(logs)
    }
}
