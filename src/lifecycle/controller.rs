use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::locks::BatchLocks;
use crate::clock::Clock;
use crate::error::{DispatchError, Error, Result};
use crate::models::{
    current_stage, Batch, BatchId, BatchLog, CurrentStage, Stage, StageId, StageStatus,
};
use crate::notify::{Dispatcher, NotificationId, NotificationScheduler, ScheduleOutcome};
use crate::planner::{anchor_for, plan, planned_completion, replan_tail, StageTemplate};
use crate::progress::{progress, Progress};
use crate::store::Store;
use crate::validation::{
    validate_duration, validate_id, validate_name, validate_notes, validate_weight,
};

/// What happened to a stage's reminder as a side effect of a transition.
///
/// Reminders are best effort: a failure here never undoes the transition.
#[derive(Debug)]
pub enum ReminderOutcome {
    Scheduled {
        notification_id: NotificationId,
        delay: Duration,
    },
    /// Nothing to schedule (planned end missing or already passed).
    Skipped,
    Cancelled,
    Failed(DispatchError),
}

#[derive(Debug)]
pub struct StageTransition {
    pub stage: Stage,
    pub batch: Batch,
    pub reminder: ReminderOutcome,
}

#[derive(Debug)]
pub struct StageRemoval {
    pub removed: Stage,
    pub remaining: Vec<Stage>,
    pub batch: Batch,
}

#[derive(Debug, Clone)]
pub struct AppendedStage {
    pub stage: Stage,
    pub batch: Batch,
}

/// Input for [`LifecycleController::create_batch`].
#[derive(Debug, Clone, Default)]
pub struct NewBatch {
    pub name: String,
    pub product_type: String,
    /// Defaults to the current time.
    pub start: Option<DateTime<Utc>>,
    pub notes: String,
    pub scan_code: Option<String>,
    /// First weigh-in in grams.
    pub initial_weight: Option<f64>,
    pub stages: Vec<StageTemplate>,
}

/// A batch with everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOverview {
    pub batch: Batch,
    pub stages: Vec<Stage>,
    pub current_stage: CurrentStage,
    pub progress: Progress,
}

/// Owns every mutation of batches and stages.
///
/// All mutating operations on one batch are serialized through a per-batch
/// lock and work on a fresh snapshot of that batch's stages. Batch creation
/// additionally holds a controller-wide lock so scan codes stay unique.
pub struct LifecycleController {
    store: Arc<dyn Store>,
    scheduler: NotificationScheduler,
    clock: Arc<dyn Clock>,
    locks: BatchLocks,
    creating: Mutex<()>,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn Store>, dispatcher: Arc<dyn Dispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            scheduler: NotificationScheduler::new(dispatcher),
            clock,
            locks: BatchLocks::new(),
            creating: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Move a stage from not-started to ongoing.
    ///
    /// A stage without a planned window is planned from now, and the stages
    /// after it are re-planned to follow on.
    pub fn start_stage(&self, stage_id: &StageId) -> Result<StageTransition> {
        let batch_id = self.load_stage(stage_id)?.batch_id;
        self.locks.with_batch(&batch_id, || {
            let now = self.clock.now();
            let mut batch = self.load_batch(&batch_id)?;
            let mut stages = self.store.stages_for_batch(&batch_id)?;
            let index = position(&stages, stage_id)?;

            if let Some(other) = stages
                .iter()
                .find(|s| s.id != *stage_id && s.status() == StageStatus::Ongoing)
            {
                return Err(Error::InvalidTransition(format!(
                    "stage '{}' of batch '{}' is still ongoing",
                    other.name, batch.name
                )));
            }

            stages[index].try_start(now)?;

            if stages[index].planned_start_time.is_none() {
                let end = stages[index].plan_from(now);
                replan_tail(&mut stages, index + 1, end);
                for stage in &stages[index..] {
                    self.store.update_stage(stage)?;
                }
                batch.planned_completion = planned_completion(&stages);
                self.store.update_batch(&batch)?;
            } else {
                self.store.update_stage(&stages[index])?;
            }

            let stage = stages.swap_remove(index);
            tracing::info!(stage_id = %stage.id, batch_id = %batch.id, stage = %stage.name, "stage started");

            let reminder = self.schedule_reminder(&stage, &batch, now);
            Ok(StageTransition {
                stage,
                batch,
                reminder,
            })
        })
    }

    /// Move a stage from ongoing to completed and cancel its reminder.
    ///
    /// Completing the last stage deactivates the batch.
    pub fn complete_stage(&self, stage_id: &StageId) -> Result<StageTransition> {
        let batch_id = self.load_stage(stage_id)?.batch_id;
        self.locks.with_batch(&batch_id, || {
            let now = self.clock.now();
            let mut batch = self.load_batch(&batch_id)?;
            let mut stages = self.store.stages_for_batch(&batch_id)?;
            let index = position(&stages, stage_id)?;

            stages[index].try_complete(now)?;
            self.store.update_stage(&stages[index])?;

            let reminder = match self.scheduler.cancel(stage_id) {
                Ok(()) => ReminderOutcome::Cancelled,
                Err(e) => {
                    tracing::warn!(stage_id = %stage_id, error = %e, "failed to cancel stage reminder");
                    ReminderOutcome::Failed(e)
                }
            };

            let last_index = stages.iter().map(|s| s.order_index).max();
            if last_index == Some(stages[index].order_index) && batch.active {
                batch.active = false;
                self.store.update_batch(&batch)?;
                tracing::info!(batch_id = %batch.id, "last stage completed, batch deactivated");
            }

            let stage = stages.swap_remove(index);
            tracing::info!(stage_id = %stage.id, batch_id = %batch.id, stage = %stage.name, "stage completed");
            Ok(StageTransition {
                stage,
                batch,
                reminder,
            })
        })
    }

    /// Delete a not-started stage, close the gap in order indexes and
    /// re-plan the stages after it.
    pub fn remove_stage(&self, stage_id: &StageId) -> Result<StageRemoval> {
        let batch_id = self.load_stage(stage_id)?.batch_id;
        self.locks.with_batch(&batch_id, || {
            let mut batch = self.load_batch(&batch_id)?;
            let mut stages = self.store.stages_for_batch(&batch_id)?;
            let index = position(&stages, stage_id)?;

            let status = stages[index].status();
            if status != StageStatus::NotStarted {
                return Err(Error::InvalidOperation(format!(
                    "cannot remove stage '{}': it is {status}",
                    stages[index].name
                )));
            }

            self.store.delete_stage(stage_id)?;
            let removed = stages.remove(index);
            let before = stages.clone();

            for (order_index, stage) in stages.iter_mut().enumerate() {
                stage.order_index = order_index;
            }
            let anchor = anchor_for(&stages, index, batch.start_date);
            replan_tail(&mut stages, index, anchor);

            for (stage, old) in stages.iter().zip(&before) {
                if stage != old {
                    self.store.update_stage(stage)?;
                }
            }

            batch.planned_completion = planned_completion(&stages);
            self.store.update_batch(&batch)?;

            tracing::info!(stage_id = %removed.id, batch_id = %batch.id, remaining = stages.len(), "stage removed");
            Ok(StageRemoval {
                removed,
                remaining: stages,
                batch,
            })
        })
    }

    /// Add a stage after the current last one, planned to start where the
    /// last stage is planned to end (or at the batch start).
    pub fn append_stage(
        &self,
        batch_id: &BatchId,
        name: &str,
        duration_hours: u32,
    ) -> Result<AppendedStage> {
        validate_name(name)?;
        validate_duration(duration_hours)?;
        self.locks.with_batch(batch_id, || {
            let mut batch = self.load_batch(batch_id)?;
            let stages = self.store.stages_for_batch(batch_id)?;

            let anchor = anchor_for(&stages, stages.len(), batch.start_date);
            let mut stage = Stage::new(
                batch_id.clone(),
                name.trim().to_string(),
                duration_hours,
                stages.len(),
            );
            let end = stage.plan_from(anchor);
            self.store.insert_stage(&stage)?;

            batch.planned_completion = Some(end);
            if !batch.active {
                batch.active = true;
                tracing::info!(batch_id = %batch.id, "batch reactivated by appended stage");
            }
            self.store.update_batch(&batch)?;

            tracing::info!(stage_id = %stage.id, batch_id = %batch.id, stage = %stage.name, "stage appended");
            Ok(AppendedStage { stage, batch })
        })
    }

    /// Create a batch and its planned stages.
    pub fn create_batch(&self, new: NewBatch) -> Result<BatchOverview> {
        validate_name(&new.name)?;
        validate_name(&new.product_type)?;
        validate_notes(&new.notes)?;
        for template in &new.stages {
            validate_name(&template.name)?;
            validate_duration(template.duration_hours)?;
        }
        if let Some(grams) = new.initial_weight {
            validate_weight(grams)?;
        }
        if let Some(code) = &new.scan_code {
            validate_id(code)?;
        }

        // Held from the scan-code check until the batch is stored
        let _creating = self.creating.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(code) = &new.scan_code {
            if self.store.batch_by_scan_code(code)?.is_some() {
                return Err(Error::InvalidOperation(format!(
                    "scan code '{code}' is already used by another batch"
                )));
            }
        }

        let now = self.clock.now();
        let start = new.start.unwrap_or(now);
        let mut batch = Batch::new(
            new.name.trim().to_string(),
            new.product_type.trim().to_lowercase(),
            start,
        );
        batch.notes = new.notes;
        batch.scan_code = new.scan_code;

        let stages = plan(&batch.id, start, &new.stages);
        batch.planned_completion = planned_completion(&stages);

        let weigh_in = new.initial_weight.map(|grams| {
            batch.record_weight(grams);
            BatchLog::weight(batch.id.clone(), now, grams)
        });

        self.locks.with_batch(&batch.id.clone(), || {
            self.store.insert_batch(&batch)?;
            for stage in &stages {
                self.store.insert_stage(stage)?;
            }
            if let Some(log) = &weigh_in {
                self.store.insert_log(log)?;
            }

            tracing::info!(batch_id = %batch.id, name = %batch.name, stages = stages.len(), "batch created");
            Ok(self.build_overview(batch, stages, now))
        })
    }

    /// Record a weigh-in. The weight is also snapshotted onto the ongoing
    /// stage, if there is one.
    pub fn log_weight(&self, batch_id: &BatchId, grams: f64, photo: Option<String>) -> Result<Batch> {
        validate_weight(grams)?;
        self.locks.with_batch(batch_id, || {
            let now = self.clock.now();
            let mut batch = self.load_batch(batch_id)?;

            let log = BatchLog::weight(batch_id.clone(), now, grams).with_photo(photo);
            self.store.insert_log(&log)?;

            batch.record_weight(grams);
            self.store.update_batch(&batch)?;

            if let Some(mut ongoing) = self
                .store
                .stages_for_batch(batch_id)?
                .into_iter()
                .find(|s| s.status() == StageStatus::Ongoing)
            {
                ongoing.current_weight = Some(grams);
                self.store.update_stage(&ongoing)?;
            }

            tracing::info!(batch_id = %batch.id, grams, "weight logged");
            Ok(batch)
        })
    }

    pub fn log_photo(&self, batch_id: &BatchId, photo: &str) -> Result<BatchLog> {
        if photo.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "photo reference cannot be empty".to_string(),
            ));
        }
        self.locks.with_batch(batch_id, || {
            self.load_batch(batch_id)?;
            let log = BatchLog::photo(batch_id.clone(), self.clock.now(), photo.trim().to_string());
            self.store.insert_log(&log)?;
            tracing::info!(batch_id = %batch_id, "photo logged");
            Ok(log)
        })
    }

    /// Deactivate a batch without deleting anything. Pending reminders of
    /// its stages are cancelled.
    pub fn finish_batch(&self, batch_id: &BatchId) -> Result<Batch> {
        self.locks.with_batch(batch_id, || {
            let mut batch = self.load_batch(batch_id)?;
            if batch.active {
                batch.active = false;
                self.store.update_batch(&batch)?;
            }
            for stage in self.store.stages_for_batch(batch_id)? {
                if stage.status() != StageStatus::Completed {
                    self.cancel_quietly(&stage.id);
                }
            }
            tracing::info!(batch_id = %batch.id, "batch finished");
            Ok(batch)
        })
    }

    /// Delete a batch with its stages and logs.
    pub fn delete_batch(&self, batch_id: &BatchId) -> Result<()> {
        self.locks.with_batch(batch_id, || -> Result<()> {
            for stage in self.store.stages_for_batch(batch_id)? {
                self.cancel_quietly(&stage.id);
            }
            if !self.store.delete_batch(batch_id)? {
                return Err(Error::NotFound(format!("batch '{batch_id}'")));
            }
            tracing::info!(batch_id = %batch_id, "batch deleted");
            Ok(())
        })?;
        self.locks.forget(batch_id);
        Ok(())
    }

    pub fn overview(&self, batch_id: &BatchId) -> Result<BatchOverview> {
        let batch = self.load_batch(batch_id)?;
        let stages = self.store.stages_for_batch(batch_id)?;
        Ok(self.build_overview(batch, stages, self.clock.now()))
    }

    /// Overviews of all batches, newest start first.
    pub fn overviews(&self, include_inactive: bool) -> Result<Vec<BatchOverview>> {
        let now = self.clock.now();
        let mut batches: Vec<Batch> = self
            .store
            .batches()?
            .into_iter()
            .filter(|b| include_inactive || b.active)
            .collect();
        batches.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        batches
            .into_iter()
            .map(|batch| {
                let stages = self.store.stages_for_batch(&batch.id)?;
                Ok(self.build_overview(batch, stages, now))
            })
            .collect()
    }

    /// Look a batch up by id, falling back to its scan code.
    pub fn find_batch(&self, key: &str) -> Result<Batch> {
        if let Some(batch) = self.store.batch(&BatchId::from(key))? {
            return Ok(batch);
        }
        self.store
            .batch_by_scan_code(key)?
            .ok_or_else(|| Error::NotFound(format!("batch '{key}'")))
    }

    /// Schedule reminders again for every ongoing stage of an active batch
    /// whose planned end is still ahead. Returns how many were scheduled.
    pub fn rearm_reminders(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut scheduled = 0;
        for batch in self.store.batches()?.into_iter().filter(|b| b.active) {
            for stage in self.store.stages_for_batch(&batch.id)? {
                if stage.status() != StageStatus::Ongoing {
                    continue;
                }
                if let ReminderOutcome::Scheduled { .. } = self.schedule_reminder(&stage, &batch, now) {
                    scheduled += 1;
                }
            }
        }
        tracing::debug!(scheduled, "reminders re-armed");
        Ok(scheduled)
    }

    fn schedule_reminder(&self, stage: &Stage, batch: &Batch, now: DateTime<Utc>) -> ReminderOutcome {
        match self.scheduler.schedule(stage, batch, now) {
            Ok(ScheduleOutcome::Scheduled {
                notification_id,
                delay,
            }) => ReminderOutcome::Scheduled {
                notification_id,
                delay,
            },
            Ok(ScheduleOutcome::AlreadyDue | ScheduleOutcome::Unplanned) => ReminderOutcome::Skipped,
            Err(e) => {
                tracing::warn!(stage_id = %stage.id, error = %e, "failed to schedule stage reminder");
                ReminderOutcome::Failed(e)
            }
        }
    }

    fn cancel_quietly(&self, stage_id: &StageId) {
        if let Err(e) = self.scheduler.cancel(stage_id) {
            tracing::warn!(stage_id = %stage_id, error = %e, "failed to cancel stage reminder");
        }
    }

    fn build_overview(&self, batch: Batch, stages: Vec<Stage>, now: DateTime<Utc>) -> BatchOverview {
        BatchOverview {
            current_stage: current_stage(&stages),
            progress: progress(&batch, now),
            batch,
            stages,
        }
    }

    fn load_batch(&self, batch_id: &BatchId) -> Result<Batch> {
        self.store
            .batch(batch_id)?
            .ok_or_else(|| Error::NotFound(format!("batch '{batch_id}'")))
    }

    fn load_stage(&self, stage_id: &StageId) -> Result<Stage> {
        self.store
            .stage(stage_id)?
            .ok_or_else(|| Error::NotFound(format!("stage '{stage_id}'")))
    }
}

fn position(stages: &[Stage], stage_id: &StageId) -> Result<usize> {
    stages
        .iter()
        .position(|s| s.id == *stage_id)
        .ok_or_else(|| Error::NotFound(format!("stage '{stage_id}'")))
}
