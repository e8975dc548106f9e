//! Batch progress.
//!
//! Cured products are tracked by weight loss; everything else by the share
//! of the planned time that has elapsed. The split is a fixed table keyed by
//! product type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::Batch;

/// Product types whose progress is measured as weight loss.
pub const WEIGHT_TRACKED_TYPES: &[&str] = &[
    "salami",
    "coppa",
    "bresaola",
    "prosciutto",
    "lonza",
    "pancetta",
    "guanciale",
    "lomo",
    "speck",
    "nduja",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingClass {
    WeightLoss,
    Elapsed,
}

/// Policy for a product type. Matching ignores case and surrounding whitespace.
pub fn tracking_class(product_type: &str) -> TrackingClass {
    let key = product_type.trim().to_lowercase();
    if WEIGHT_TRACKED_TYPES.contains(&key.as_str()) {
        TrackingClass::WeightLoss
    } else {
        TrackingClass::Elapsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "kebab-case")]
pub enum Progress {
    /// Weight lost since the first weigh-in, in percent with two decimals.
    WeightLoss(f64),
    /// Share of the planned duration elapsed, 0..=100.
    Elapsed(u8),
    NotApplicable,
}

impl Progress {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Progress::WeightLoss(pct) => Some(*pct),
            Progress::Elapsed(pct) => Some(f64::from(*pct)),
            Progress::NotApplicable => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::WeightLoss(pct) => write!(f, "{pct:.2}% weight loss"),
            Progress::Elapsed(pct) => write!(f, "{pct}% elapsed"),
            Progress::NotApplicable => write!(f, "n/a"),
        }
    }
}

pub fn progress(batch: &Batch, now: DateTime<Utc>) -> Progress {
    match tracking_class(&batch.product_type) {
        TrackingClass::WeightLoss => batch
            .initial_weight
            .zip(batch.current_weight)
            .and_then(|(initial, current)| weight_loss_percent(initial, current))
            .map(Progress::WeightLoss)
            .unwrap_or(Progress::NotApplicable),
        TrackingClass::Elapsed => batch
            .planned_completion
            .and_then(|planned| elapsed_percent(batch.start_date, planned, now))
            .map(Progress::Elapsed)
            .unwrap_or(Progress::NotApplicable),
    }
}

/// `(initial - current) / initial * 100`, rounded to two decimals.
/// `None` unless `initial > 0`.
pub fn weight_loss_percent(initial: f64, current: f64) -> Option<f64> {
    if !initial.is_finite() || initial <= 0.0 || !current.is_finite() {
        return None;
    }
    let pct = (initial - current) / initial * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// Rounded share of `[start, planned]` covered at `now`, clamped to 0..=100.
/// `None` unless `planned` is strictly after `start`.
pub fn elapsed_percent(
    start: DateTime<Utc>,
    planned: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<u8> {
    let total = planned.signed_duration_since(start).num_milliseconds();
    if total <= 0 {
        return None;
    }
    let elapsed = now.signed_duration_since(start).num_milliseconds();
    let pct = (elapsed as f64 / total as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}
