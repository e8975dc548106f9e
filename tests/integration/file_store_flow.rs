//! Integration tests for the file-backed store

use chrono::Duration;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use ferment::models::StageStatus;
use ferment::store::{FileStore, Store};

use super::helpers::{batch_a, engine, t0};

#[test]
fn test_lifecycle_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let (batch_id, first) = {
        let e = engine(Arc::new(FileStore::open(temp.path()).unwrap()));
        let overview = e.controller.create_batch(batch_a()).unwrap();
        let first = overview.stages[0].id.clone();
        e.controller.start_stage(&first).unwrap();
        e.controller
            .log_weight(&overview.batch.id, 1200.0, Some("day0.jpg".into()))
            .unwrap();
        (overview.batch.id, first)
    };

    let store = Arc::new(FileStore::open(temp.path()).unwrap());
    let stages = store.stages_for_batch(&batch_id).unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].id, first);
    assert_eq!(stages[0].status(), StageStatus::Ongoing);
    assert_eq!(stages[0].current_weight, Some(1200.0));
    assert_eq!(
        stages[1].planned_end_time,
        Some(t0() + Duration::hours(372))
    );

    let e = engine(store.clone());
    e.clock.set(t0() + Duration::hours(36));
    e.controller.complete_stage(&first).unwrap();
    assert_eq!(
        store.stage(&first).unwrap().unwrap().status(),
        StageStatus::Completed
    );
    assert_eq!(store.logs_for_batch(&batch_id).unwrap().len(), 1);
}

#[test]
fn test_record_file_is_readable_markdown() {
    let temp = TempDir::new().unwrap();
    let e = engine(Arc::new(FileStore::open(temp.path()).unwrap()));
    let overview = e.controller.create_batch(batch_a()).unwrap();
    e.controller.start_stage(&overview.stages[0].id).unwrap();

    let path = temp
        .path()
        .join("batches")
        .join(format!("{}.md", overview.batch.id));
    let content = fs::read_to_string(path).unwrap();

    assert!(content.starts_with("---\n"));
    assert!(content.contains("# Batch: Batch-A"));
    assert!(content.contains("- [~] Fermentation (36h)"));
    assert!(content.contains("- [ ] Drying (336h)"));
}

#[test]
fn test_delete_removes_record_file() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(temp.path()).unwrap());
    let e = engine(store.clone());
    let overview = e.controller.create_batch(batch_a()).unwrap();

    e.controller.delete_batch(&overview.batch.id).unwrap();

    assert!(store.batches().unwrap().is_empty());
    assert!(store.stage(&overview.stages[0].id).unwrap().is_none());
    assert_eq!(fs::read_dir(temp.path().join("batches")).unwrap().count(), 0);
}
