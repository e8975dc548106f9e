use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{COMPLETED_LABEL, NO_STAGES_LABEL};
use super::ids::BatchId;
use super::stage::{Stage, StageStatus};

/// One tracked production run.
///
/// The current stage is never stored here; it is derived from the batch's
/// stage list with [`current_stage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
    /// Key into the recipe catalogue; also selects the progress policy
    pub product_type: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub active: bool,
    /// External scan code (QR/barcode label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_code: Option<String>,
    /// Grams at the first weigh-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_weight: Option<f64>,
    /// Grams at the latest weigh-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    /// Planned end of the last stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_completion: Option<DateTime<Utc>>,
}

impl Batch {
    pub fn new(name: String, product_type: String, start_date: DateTime<Utc>) -> Self {
        Self {
            id: BatchId::generate(),
            name,
            product_type,
            start_date,
            notes: String::new(),
            active: true,
            scan_code: None,
            initial_weight: None,
            current_weight: None,
            planned_completion: None,
        }
    }

    /// Record a weigh-in. The first sample also becomes the initial weight.
    pub fn record_weight(&mut self, grams: f64) {
        if self.initial_weight.is_none() {
            self.initial_weight = Some(grams);
        }
        self.current_weight = Some(grams);
    }
}

/// Derived "current stage" of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum CurrentStage {
    /// Earliest stage that is not completed.
    Stage(String),
    /// Every stage is completed.
    Completed,
    /// The batch has no stages.
    NoStages,
}

impl CurrentStage {
    pub fn label(&self) -> &str {
        match self {
            CurrentStage::Stage(name) => name,
            CurrentStage::Completed => COMPLETED_LABEL,
            CurrentStage::NoStages => NO_STAGES_LABEL,
        }
    }
}

impl fmt::Display for CurrentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Name of the first stage (by order index) that is not completed.
///
/// `stages` need not be sorted.
pub fn current_stage(stages: &[Stage]) -> CurrentStage {
    if stages.is_empty() {
        return CurrentStage::NoStages;
    }

    stages
        .iter()
        .filter(|s| s.status() != StageStatus::Completed)
        .min_by_key(|s| s.order_index)
        .map(|s| CurrentStage::Stage(s.name.clone()))
        .unwrap_or(CurrentStage::Completed)
}
