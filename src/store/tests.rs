use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{InMemoryStore, Store};
use crate::error::StoreError;
use crate::models::{Batch, BatchLog, Stage};
use crate::planner::{plan, StageTemplate};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn seed(store: &InMemoryStore, name: &str, durations: &[u32]) -> (Batch, Vec<Stage>) {
    let batch = Batch::new(name.into(), "salami".into(), t0());
    let templates: Vec<StageTemplate> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| StageTemplate::new(format!("{name}-{i}"), *d))
        .collect();
    let stages = plan(&batch.id, t0(), &templates);
    store.insert_batch(&batch).unwrap();
    for stage in &stages {
        store.insert_stage(stage).unwrap();
    }
    (batch, stages)
}

fn complete(store: &InMemoryStore, stage: &Stage, at: DateTime<Utc>) -> Stage {
    let mut stage = stage.clone();
    stage.start_time = Some(at - Duration::hours(1));
    stage.end_time = Some(at);
    store.update_stage(&stage).unwrap();
    stage
}

#[test]
fn test_stages_for_batch_ordered_by_index() {
    let store = InMemoryStore::new();
    let (batch, stages) = seed(&store, "a", &[1, 2, 3, 4]);
    seed(&store, "b", &[5]);

    let loaded = store.stages_for_batch(&batch.id).unwrap();
    let ids: Vec<_> = loaded.iter().map(|s| s.id.clone()).collect();
    let expected: Vec<_> = stages.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_insert_stage_requires_batch() {
    let store = InMemoryStore::new();
    let batch = Batch::new("orphan".into(), "beer".into(), t0());
    let stage = Stage::new(batch.id.clone(), "Boil".into(), 1, 0);
    assert!(matches!(
        store.insert_stage(&stage),
        Err(StoreError::Missing(_))
    ));
}

#[test]
fn test_duplicate_insert_conflicts() {
    let store = InMemoryStore::new();
    let (batch, stages) = seed(&store, "a", &[1]);
    assert!(matches!(
        store.insert_batch(&batch),
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(
        store.insert_stage(&stages[0]),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn test_delete_batch_cascades_to_stages_and_logs() {
    let store = InMemoryStore::new();
    let (batch, stages) = seed(&store, "a", &[1, 2]);
    let (other, _) = seed(&store, "b", &[3]);
    store
        .insert_log(&BatchLog::weight(batch.id.clone(), t0(), 1000.0))
        .unwrap();

    assert!(store.delete_batch(&batch.id).unwrap());

    assert!(store.stage(&stages[0].id).unwrap().is_none());
    assert!(store.logs_for_batch(&batch.id).unwrap().is_empty());
    assert_eq!(store.stages_for_batch(&other.id).unwrap().len(), 1);
    assert!(!store.delete_batch(&batch.id).unwrap());
}

#[test]
fn test_count_active_batches() {
    let store = InMemoryStore::new();
    assert_eq!(store.count_active_batches().unwrap(), 0);
    let (mut a, _) = seed(&store, "a", &[1]);
    seed(&store, "b", &[1]);
    a.active = false;
    store.update_batch(&a).unwrap();
    assert_eq!(store.count_active_batches().unwrap(), 1);
}

#[test]
fn test_count_stages_completed_between() {
    let store = InMemoryStore::new();
    let (_, stages) = seed(&store, "a", &[1, 1, 1]);
    let now = t0() + Duration::days(30);
    complete(&store, &stages[0], now - Duration::days(8));
    complete(&store, &stages[1], now - Duration::days(6));
    complete(&store, &stages[2], now);

    let since = now - Duration::days(7);
    assert_eq!(store.count_stages_completed_between(since, now).unwrap(), 2);
}

#[test]
fn test_next_planned_end_after_skips_past_and_completed() {
    let store = InMemoryStore::new();
    let (_, a) = seed(&store, "a", &[10, 10]);
    let (_, b) = seed(&store, "b", &[15]);

    let now = t0() + Duration::hours(11);
    // a[0] ended in the past; a[1] ends at +20h; b[0] ends at +15h
    let next = store.next_planned_end_after(now).unwrap().unwrap();
    assert_eq!(next.id, b[0].id);

    complete(&store, &b[0], now);
    let next = store.next_planned_end_after(now).unwrap().unwrap();
    assert_eq!(next.id, a[1].id);

    let much_later = t0() + Duration::days(10);
    assert!(store.next_planned_end_after(much_later).unwrap().is_none());
}

#[test]
fn test_next_planned_end_ignores_inactive_batches() {
    let store = InMemoryStore::new();
    let (mut finished, _) = seed(&store, "finished", &[5]);
    let (_, running) = seed(&store, "running", &[50]);

    finished.active = false;
    store.update_batch(&finished).unwrap();

    let next = store.next_planned_end_after(t0()).unwrap().unwrap();
    assert_eq!(next.id, running[0].id);
}

#[test]
fn test_recently_completed_newest_first() {
    let store = InMemoryStore::new();
    let (_, stages) = seed(&store, "a", &[1, 1, 1]);
    complete(&store, &stages[0], t0() + Duration::hours(1));
    complete(&store, &stages[2], t0() + Duration::hours(3));
    complete(&store, &stages[1], t0() + Duration::hours(2));

    let recent = store.recently_completed_stages(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, stages[2].id);
    assert_eq!(recent[1].id, stages[1].id);
}

#[test]
fn test_aggregates_on_empty_store() {
    let store = InMemoryStore::new();
    assert_eq!(store.count_active_batches().unwrap(), 0);
    assert_eq!(
        store
            .count_stages_completed_between(t0() - Duration::days(7), t0())
            .unwrap(),
        0
    );
    assert!(store.next_planned_end_after(t0()).unwrap().is_none());
    assert!(store.recently_completed_stages(5).unwrap().is_empty());
}
