use chrono::{DateTime, Duration, Utc};

use super::types::{Stage, StageStatus};
use crate::error::Result;
use crate::models::constants::MILLIS_PER_HOUR;
use crate::models::ids::{BatchId, StageId};

impl Stage {
    pub fn new(batch_id: BatchId, name: String, duration_hours: u32, order_index: usize) -> Self {
        Self {
            id: StageId::generate(),
            batch_id,
            name,
            duration_hours,
            order_index,
            start_time: None,
            end_time: None,
            planned_start_time: None,
            planned_end_time: None,
            current_weight: None,
        }
    }

    /// Status derived from `(start_time, end_time)`.
    ///
    /// A record with an end but no start is treated as not started; the
    /// controller never produces one.
    pub fn status(&self) -> StageStatus {
        match (self.start_time, self.end_time) {
            (Some(_), Some(_)) => StageStatus::Completed,
            (Some(_), None) => StageStatus::Ongoing,
            (None, _) => StageStatus::NotStarted,
        }
    }

    /// Planned length of the stage.
    pub fn planned_duration(&self) -> Duration {
        Duration::milliseconds(i64::from(self.duration_hours) * MILLIS_PER_HOUR)
    }

    /// Set the planned window to `[start, start + duration)` and return its end.
    pub fn plan_from(&mut self, start: DateTime<Utc>) -> DateTime<Utc> {
        let end = start + self.planned_duration();
        self.planned_start_time = Some(start);
        self.planned_end_time = Some(end);
        end
    }

    /// Transition `NotStarted -> Ongoing` at `now`.
    pub fn try_start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.status().try_transition(StageStatus::Ongoing)?;
        self.start_time = Some(now);
        Ok(())
    }

    /// Transition `Ongoing -> Completed` at `now`.
    pub fn try_complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.status().try_transition(StageStatus::Completed)?;
        self.end_time = Some(now);
        Ok(())
    }

    /// Actual time spent in the stage so far (or in total once completed).
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start_time?;
        Some(self.end_time.unwrap_or(now).signed_duration_since(start))
    }
}
