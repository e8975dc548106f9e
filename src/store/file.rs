//! File-backed store
//!
//! One markdown file per batch in `<data_dir>/batches/`, named `<batch-id>.md`.
//! The file holds the batch together with its stages and logs, so deleting
//! the file is the cascade delete.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::locking::{locked_read, locked_update};
use super::serialization::{
    parse_record_from_markdown, serialize_record_to_markdown, BatchRecord,
};
use super::{sort_logs, sort_stages, Store, StoreResult};
use crate::error::StoreError;
use crate::models::{Batch, BatchId, BatchLog, Stage, StageId};
use crate::validation::validate_id;

pub struct FileStore {
    batches_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let batches_dir = data_dir.join("batches");
        fs::create_dir_all(&batches_dir).map_err(|e| {
            StoreError::Io(format!(
                "Failed to create batches directory {}: {e}",
                batches_dir.display()
            ))
        })?;
        Ok(Self { batches_dir })
    }

    fn batch_path(&self, id: &BatchId) -> StoreResult<PathBuf> {
        // Ids end up in file names
        validate_id(id.as_str()).map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(self.batches_dir.join(format!("{id}.md")))
    }

    fn load_record(&self, id: &BatchId) -> StoreResult<Option<BatchRecord>> {
        let path = self.batch_path(id)?;
        match locked_read(&path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => parse_record_from_markdown(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("{}: {e}", path.display()))),
        }
    }

    fn load_all_records(&self) -> StoreResult<Vec<BatchRecord>> {
        let entries = match fs::read_dir(&self.batches_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            match locked_read(&path) {
                // Half-created file from an interrupted insert
                Ok(content) if content.trim().is_empty() => continue,
                Ok(content) => records.push(parse_record_from_markdown(&content).map_err(
                    |e| StoreError::Serialization(format!("{}: {e}", path.display())),
                )?),
                // Deleted between listing and reading
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(records)
    }

    /// Apply `change` to an existing batch record under an exclusive lock.
    fn modify_record<F>(&self, id: &BatchId, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BatchRecord) -> StoreResult<()>,
    {
        let path = self.batch_path(id)?;
        if !path.exists() {
            return Err(StoreError::Missing(format!("batch {id}")));
        }
        locked_update(&path, |content| {
            if content.trim().is_empty() {
                return Err(StoreError::Missing(format!("batch {id}")));
            }
            let mut record = parse_record_from_markdown(content)?;
            change(&mut record)?;
            serialize_record_to_markdown(&record)
        })
    }

    fn find_stage_record(&self, id: &StageId) -> StoreResult<Option<(BatchRecord, usize)>> {
        Ok(self.load_all_records()?.into_iter().find_map(|record| {
            let index = record.stages.iter().position(|s| &s.id == id)?;
            Some((record, index))
        }))
    }
}

impl Store for FileStore {
    fn insert_batch(&self, batch: &Batch) -> StoreResult<()> {
        let path = self.batch_path(&batch.id)?;
        locked_update(&path, |content| {
            if !content.trim().is_empty() {
                return Err(StoreError::Conflict(format!("batch {}", batch.id)));
            }
            serialize_record_to_markdown(&BatchRecord::new(batch.clone()))
        })
    }

    fn update_batch(&self, batch: &Batch) -> StoreResult<()> {
        self.modify_record(&batch.id, |record| {
            record.batch = batch.clone();
            Ok(())
        })
    }

    fn delete_batch(&self, id: &BatchId) -> StoreResult<bool> {
        let path = self.batch_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn batch(&self, id: &BatchId) -> StoreResult<Option<Batch>> {
        Ok(self.load_record(id)?.map(|r| r.batch))
    }

    fn batch_by_scan_code(&self, scan_code: &str) -> StoreResult<Option<Batch>> {
        Ok(self
            .load_all_records()?
            .into_iter()
            .map(|r| r.batch)
            .find(|b| b.scan_code.as_deref() == Some(scan_code)))
    }

    fn batches(&self) -> StoreResult<Vec<Batch>> {
        let mut batches: Vec<Batch> = self
            .load_all_records()?
            .into_iter()
            .map(|r| r.batch)
            .collect();
        batches.sort_by_key(|b| b.start_date);
        Ok(batches)
    }

    fn insert_stage(&self, stage: &Stage) -> StoreResult<()> {
        self.modify_record(&stage.batch_id, |record| {
            if record.stages.iter().any(|s| s.id == stage.id) {
                return Err(StoreError::Conflict(format!("stage {}", stage.id)));
            }
            record.stages.push(stage.clone());
            sort_stages(&mut record.stages);
            Ok(())
        })
    }

    fn update_stage(&self, stage: &Stage) -> StoreResult<()> {
        self.modify_record(&stage.batch_id, |record| {
            let existing = record
                .stages
                .iter_mut()
                .find(|s| s.id == stage.id)
                .ok_or_else(|| StoreError::Missing(format!("stage {}", stage.id)))?;
            *existing = stage.clone();
            sort_stages(&mut record.stages);
            Ok(())
        })
    }

    fn delete_stage(&self, id: &StageId) -> StoreResult<bool> {
        let Some((record, _)) = self.find_stage_record(id)? else {
            return Ok(false);
        };
        let mut removed = false;
        self.modify_record(&record.batch.id, |record| {
            let before = record.stages.len();
            record.stages.retain(|s| &s.id != id);
            removed = record.stages.len() != before;
            Ok(())
        })?;
        Ok(removed)
    }

    fn stage(&self, id: &StageId) -> StoreResult<Option<Stage>> {
        Ok(self
            .find_stage_record(id)?
            .map(|(mut record, index)| record.stages.swap_remove(index)))
    }

    fn stages_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<Stage>> {
        let mut stages = self
            .load_record(batch_id)?
            .map(|r| r.stages)
            .unwrap_or_default();
        sort_stages(&mut stages);
        Ok(stages)
    }

    fn all_stages(&self) -> StoreResult<Vec<Stage>> {
        Ok(self
            .load_all_records()?
            .into_iter()
            .flat_map(|r| r.stages)
            .collect())
    }

    fn insert_log(&self, log: &BatchLog) -> StoreResult<()> {
        self.modify_record(&log.batch_id, |record| {
            record.logs.push(log.clone());
            sort_logs(&mut record.logs);
            Ok(())
        })
    }

    fn logs_for_batch(&self, batch_id: &BatchId) -> StoreResult<Vec<BatchLog>> {
        Ok(self
            .load_record(batch_id)?
            .map(|r| r.logs)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{plan, StageTemplate};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn seeded(store: &FileStore) -> (Batch, Vec<Stage>) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let batch = Batch::new("Batch-A".into(), "salami".into(), start);
        let stages = plan(
            &batch.id,
            start,
            &[StageTemplate::new("Curing", 36), StageTemplate::new("Drying", 336)],
        );
        store.insert_batch(&batch).unwrap();
        for stage in &stages {
            store.insert_stage(stage).unwrap();
        }
        (batch, stages)
    }

    #[test]
    fn test_batch_file_written_under_batches_dir() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (batch, _) = seeded(&store);

        let path = temp.path().join("batches").join(format!("{}.md", batch.id));
        assert!(path.exists());
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("# Batch: Batch-A"));
    }

    #[test]
    fn test_insert_batch_twice_conflicts() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (batch, _) = seeded(&store);
        assert!(matches!(
            store.insert_batch(&batch),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn test_stage_lookup_scans_batches() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (_, stages) = seeded(&store);
        let (_, other) = seeded(&store);

        let found = store.stage(&other[1].id).unwrap().unwrap();
        assert_eq!(found, other[1]);
        assert_eq!(store.all_stages().unwrap().len(), 4);
        assert!(store.stage(&StageId::from("missing")).unwrap().is_none());
        assert_eq!(store.stage(&stages[0].id).unwrap().unwrap().name, "Curing");
    }

    #[test]
    fn test_update_stage_persists() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (batch, mut stages) = seeded(&store);

        stages[0].start_time = stages[0].planned_start_time;
        store.update_stage(&stages[0]).unwrap();

        let reopened = FileStore::open(temp.path()).unwrap();
        let loaded = reopened.stages_for_batch(&batch.id).unwrap();
        assert_eq!(loaded[0].start_time, stages[0].start_time);
        assert_eq!(loaded[1].order_index, 1);
    }

    #[test]
    fn test_delete_batch_cascades() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (batch, stages) = seeded(&store);
        store
            .insert_log(&BatchLog::weight(batch.id.clone(), batch.start_date, 1000.0))
            .unwrap();

        assert!(store.delete_batch(&batch.id).unwrap());
        assert!(store.batch(&batch.id).unwrap().is_none());
        assert!(store.stage(&stages[0].id).unwrap().is_none());
        assert!(store.logs_for_batch(&batch.id).unwrap().is_empty());
        assert!(!store.delete_batch(&batch.id).unwrap());
    }

    #[test]
    fn test_update_missing_batch_fails() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let batch = Batch::new("Ghost".into(), "beer".into(), Utc::now());
        assert!(matches!(
            store.update_batch(&batch),
            Err(StoreError::Missing(_))
        ));
    }

    #[test]
    fn test_logs_sorted_by_timestamp() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (batch, _) = seeded(&store);
        let later = batch.start_date + Duration::days(3);
        store
            .insert_log(&BatchLog::weight(batch.id.clone(), later, 900.0))
            .unwrap();
        store
            .insert_log(&BatchLog::weight(batch.id.clone(), batch.start_date, 1000.0))
            .unwrap();

        let logs = store.logs_for_batch(&batch.id).unwrap();
        assert_eq!(logs[0].weight, Some(1000.0));
        assert_eq!(logs[1].weight, Some(900.0));
    }

    #[test]
    fn test_scan_code_lookup() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let (mut batch, _) = seeded(&store);
        batch.scan_code = Some("LBL-0042".into());
        store.update_batch(&batch).unwrap();

        let found = store.batch_by_scan_code("LBL-0042").unwrap().unwrap();
        assert_eq!(found.id, batch.id);
        assert!(store.batch_by_scan_code("LBL-0000").unwrap().is_none());
    }
}
