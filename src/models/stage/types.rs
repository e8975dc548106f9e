use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ids::{BatchId, StageId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub batch_id: BatchId,
    pub name: String,
    pub duration_hours: u32,
    /// 0-based position within the batch; contiguous across the batch's stages
    pub order_index: usize,
    /// Actual start; set by the lifecycle controller only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Actual end; set by the lifecycle controller only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_time: Option<DateTime<Utc>>,
    /// Weight snapshot (grams) taken while this stage was ongoing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
}

/// Status of a stage, derived from its actual start/end times.
///
/// State machine transitions:
/// - `NotStarted` -> `Ongoing` (stage started)
/// - `Ongoing` -> `Completed` (stage completed)
/// - `Completed` is a terminal state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StageStatus {
    #[serde(rename = "not-started")]
    NotStarted,

    #[serde(rename = "ongoing")]
    Ongoing,

    #[serde(rename = "completed")]
    Completed,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::NotStarted => write!(f, "NotStarted"),
            StageStatus::Ongoing => write!(f, "Ongoing"),
            StageStatus::Completed => write!(f, "Completed"),
        }
    }
}
