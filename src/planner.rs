//! Stage planning: lays out back-to-back planned windows for an ordered
//! stage sequence.
//!
//! Planning is pure. Stage `i` starts where stage `i - 1` ends (the first
//! stage starts at the batch start) and lasts `duration_hours`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BatchId, Stage, StageStatus};

/// A stage definition before it belongs to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    pub name: String,
    pub duration_hours: u32,
}

impl StageTemplate {
    pub fn new(name: impl Into<String>, duration_hours: u32) -> Self {
        Self {
            name: name.into(),
            duration_hours,
        }
    }
}

/// Build the stages of a batch from templates, with planned windows filled.
///
/// Order indexes are assigned `0..n` in template order. An empty template
/// list yields no stages.
pub fn plan(batch_id: &BatchId, batch_start: DateTime<Utc>, templates: &[StageTemplate]) -> Vec<Stage> {
    let mut stages: Vec<Stage> = templates
        .iter()
        .enumerate()
        .map(|(index, t)| Stage::new(batch_id.clone(), t.name.clone(), t.duration_hours, index))
        .collect();
    replan_tail(&mut stages, 0, batch_start);
    stages
}

/// Re-plan `stages[from..]` starting at `anchor`.
///
/// `stages` must be sorted by order index. Stages that have already started
/// keep their planned window as history; the cursor moves on from their
/// planned end. Returns the planned end of the last stage, if any.
pub fn replan_tail(stages: &mut [Stage], from: usize, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut cursor = anchor;
    for stage in stages.iter_mut().skip(from) {
        if stage.status() == StageStatus::NotStarted {
            cursor = stage.plan_from(cursor);
        } else if let Some(end) = stage.planned_end_time {
            cursor = end;
        }
    }
    planned_completion(stages)
}

/// Where the stage at `index` should start: the previous stage's planned end,
/// or the batch start for the first stage.
pub fn anchor_for(stages: &[Stage], index: usize, batch_start: DateTime<Utc>) -> DateTime<Utc> {
    index
        .checked_sub(1)
        .and_then(|prev| stages.get(prev))
        .and_then(|s| s.planned_end_time)
        .unwrap_or(batch_start)
}

/// Planned end of the last stage by order index.
pub fn planned_completion(stages: &[Stage]) -> Option<DateTime<Utc>> {
    stages
        .iter()
        .max_by_key(|s| s.order_index)
        .and_then(|s| s.planned_end_time)
}
