//! Read-only projections for the dashboard, recomputed on every call.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::constants::RECENT_COMPLETION_WINDOW_DAYS;
use crate::models::{Batch, Stage};
use crate::progress::{tracking_class, weight_loss_percent, TrackingClass};
use crate::store::Store;

/// A stage together with the name of the batch it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageEvent {
    pub batch_name: Option<String>,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub active_batches: usize,
    /// Stages whose actual end falls in the trailing seven days.
    pub completed_last_7_days: usize,
    /// Mean weight loss over weight-tracked batches with usable weigh-ins.
    pub average_weight_loss: Option<f64>,
    /// Unfinished stage of an active batch with the earliest planned end
    /// still ahead.
    pub next_event: Option<StageEvent>,
    /// Most recently completed stages, newest first.
    pub recent_completions: Vec<StageEvent>,
}

pub fn summarize(store: &dyn Store, now: DateTime<Utc>, recent_limit: usize) -> Result<DashboardSummary> {
    let since = now - Duration::days(RECENT_COMPLETION_WINDOW_DAYS);
    let batches = store.batches()?;

    let next_event = store
        .next_planned_end_after(now)?
        .map(|stage| with_batch_name(&batches, stage));
    let recent_completions = store
        .recently_completed_stages(recent_limit)?
        .into_iter()
        .map(|stage| with_batch_name(&batches, stage))
        .collect();

    Ok(DashboardSummary {
        active_batches: store.count_active_batches()?,
        completed_last_7_days: store.count_stages_completed_between(since, now)?,
        average_weight_loss: average_weight_loss(&batches),
        next_event,
        recent_completions,
    })
}

/// Average of the per-batch weight loss, two decimals. `None` when no
/// weight-tracked batch has valid weights.
pub fn average_weight_loss(batches: &[Batch]) -> Option<f64> {
    let losses: Vec<f64> = batches
        .iter()
        .filter(|b| tracking_class(&b.product_type) == TrackingClass::WeightLoss)
        .filter_map(|b| weight_loss_percent(b.initial_weight?, b.current_weight?))
        .collect();

    if losses.is_empty() {
        return None;
    }
    let mean = losses.iter().sum::<f64>() / losses.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

fn with_batch_name(batches: &[Batch], stage: Stage) -> StageEvent {
    StageEvent {
        batch_name: batches
            .iter()
            .find(|b| b.id == stage.batch_id)
            .map(|b| b.name.clone()),
        stage,
    }
}
