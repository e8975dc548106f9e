//! Integration tests for stage planning and transitions

use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use ferment::clock::Clock;
use ferment::dashboard::summarize;
use ferment::error::Error;
use ferment::lifecycle::ReminderOutcome;
use ferment::models::{current_stage, CurrentStage, StageStatus};
use ferment::progress::Progress;
use ferment::store::{InMemoryStore, Store};

use super::helpers::{batch_a, engine, t0};

#[test]
fn test_batch_a_end_to_end() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store.clone());

    let overview = e.controller.create_batch(batch_a()).unwrap();
    let batch_id = overview.batch.id.clone();
    let first = overview.stages[0].id.clone();
    let second = overview.stages[1].id.clone();

    assert_eq!(
        overview.stages[1].planned_end_time,
        Some(t0() + Duration::hours(372))
    );
    assert_eq!(overview.current_stage, CurrentStage::Stage("Fermentation".into()));
    let second_window = (
        overview.stages[1].planned_start_time,
        overview.stages[1].planned_end_time,
    );

    let started = e.controller.start_stage(&first).unwrap();
    assert_eq!(started.stage.status(), StageStatus::Ongoing);
    assert_eq!(
        current_stage(&store.stages_for_batch(&batch_id).unwrap()),
        CurrentStage::Stage("Fermentation".into())
    );

    e.clock.set(t0() + Duration::hours(36));
    let completed = e.controller.complete_stage(&first).unwrap();
    assert_eq!(completed.stage.status(), StageStatus::Completed);
    assert!(completed.batch.active);

    let stages = store.stages_for_batch(&batch_id).unwrap();
    assert_eq!(stages[1].status(), StageStatus::NotStarted);
    assert_eq!(
        (stages[1].planned_start_time, stages[1].planned_end_time),
        second_window
    );
    assert_eq!(current_stage(&stages), CurrentStage::Stage("Drying".into()));
    assert_eq!(stages[1].id, second);
}

#[test]
fn test_one_ongoing_stage_through_full_run() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store.clone());
    let overview = e.controller.create_batch(batch_a()).unwrap();
    let ids: Vec<_> = overview.stages.iter().map(|s| s.id.clone()).collect();

    e.controller.start_stage(&ids[0]).unwrap();
    assert!(matches!(
        e.controller.start_stage(&ids[1]),
        Err(Error::InvalidTransition(_))
    ));
    assert!(matches!(
        e.controller.complete_stage(&ids[1]),
        Err(Error::InvalidTransition(_))
    ));

    e.clock.advance(Duration::hours(40));
    e.controller.complete_stage(&ids[0]).unwrap();
    e.controller.start_stage(&ids[1]).unwrap();

    let ongoing = store
        .stages_for_batch(&overview.batch.id)
        .unwrap()
        .iter()
        .filter(|s| s.status() == StageStatus::Ongoing)
        .count();
    assert_eq!(ongoing, 1);

    e.clock.advance(Duration::hours(340));
    let last = e.controller.complete_stage(&ids[1]).unwrap();
    assert!(!last.batch.active);
    assert_eq!(
        e.controller.overview(&overview.batch.id).unwrap().current_stage,
        CurrentStage::Completed
    );
}

#[test]
fn test_reminder_follows_stage_lifecycle() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store);
    let overview = e.controller.create_batch(batch_a()).unwrap();
    let first = overview.stages[0].id.clone();

    e.clock.set(t0() + Duration::hours(1));
    let started = e.controller.start_stage(&first).unwrap();
    assert!(matches!(started.reminder, ReminderOutcome::Scheduled { .. }));
    assert_eq!(
        e.dispatcher.pending_delay(&first),
        Some(StdDuration::from_secs(35 * 3600))
    );

    e.clock.set(t0() + Duration::hours(30));
    e.controller.complete_stage(&first).unwrap();
    assert_eq!(e.dispatcher.pending_count(), 0);
}

#[test]
fn test_late_start_past_planned_end_issues_no_request() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store);
    let overview = e.controller.create_batch(batch_a()).unwrap();

    e.clock.set(t0() + Duration::hours(37));
    let started = e.controller.start_stage(&overview.stages[0].id).unwrap();

    assert!(matches!(started.reminder, ReminderOutcome::Skipped));
    assert_eq!(e.dispatcher.requests(), 0);
}

#[test]
fn test_remove_then_append_keeps_plan_contiguous() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store.clone());
    let overview = e.controller.create_batch(batch_a()).unwrap();
    let batch_id = overview.batch.id.clone();

    e.controller.remove_stage(&overview.stages[0].id).unwrap();
    e.controller
        .append_stage(&batch_id, "Vacuum rest", 24)
        .unwrap();

    let stages = store.stages_for_batch(&batch_id).unwrap();
    let indexes: Vec<_> = stages.iter().map(|s| s.order_index).collect();
    assert_eq!(indexes, vec![0, 1]);
    assert_eq!(stages[0].planned_start_time, Some(t0()));
    assert_eq!(stages[1].planned_start_time, stages[0].planned_end_time);
    assert_eq!(
        store.batch(&batch_id).unwrap().unwrap().planned_completion,
        Some(t0() + Duration::hours(360))
    );
}

#[test]
fn test_weight_progress_and_dashboard() {
    let store = Arc::new(InMemoryStore::new());
    let e = engine(store.clone());
    let salami = e.controller.create_batch(batch_a()).unwrap();

    let mut beer = batch_a();
    beer.name = "Pale ale".into();
    beer.product_type = "beer".into();
    let beer = e.controller.create_batch(beer).unwrap();

    e.controller
        .log_weight(&salami.batch.id, 1000.0, None)
        .unwrap();
    e.controller
        .log_weight(&salami.batch.id, 850.0, None)
        .unwrap();
    e.controller.start_stage(&beer.stages[0].id).unwrap();

    e.clock.set(t0() + Duration::hours(93));
    assert_eq!(
        e.controller.overview(&salami.batch.id).unwrap().progress,
        Progress::WeightLoss(15.0)
    );
    assert_eq!(
        e.controller.overview(&beer.batch.id).unwrap().progress,
        Progress::Elapsed(25)
    );

    e.controller.complete_stage(&beer.stages[0].id).unwrap();
    let summary = summarize(store.as_ref(), e.clock.now(), 5).unwrap();
    assert_eq!(summary.active_batches, 2);
    assert_eq!(summary.completed_last_7_days, 1);
    assert_eq!(summary.average_weight_loss, Some(15.0));
    assert_eq!(summary.recent_completions[0].stage.id, beer.stages[0].id);
    // beer's second stage: planned end t0+372h
    assert_eq!(
        summary.next_event.unwrap().stage.planned_end_time,
        Some(t0() + Duration::hours(372))
    );
}
