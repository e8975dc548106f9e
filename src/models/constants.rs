/// Milliseconds in one hour; planned windows are `duration_hours * MILLIS_PER_HOUR` long.
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Label reported as the current stage once every stage of a batch is completed.
pub const COMPLETED_LABEL: &str = "Completed";

/// Label reported as the current stage of a batch that has no stages at all.
pub const NO_STAGES_LABEL: &str = "No stages";

/// Trailing window, in days, for the dashboard's "completed recently" count.
pub const RECENT_COMPLETION_WINDOW_DAYS: i64 = 7;

/// Default number of completed stages listed on the dashboard.
pub const DEFAULT_RECENT_COMPLETIONS: usize = 5;

/// Progress thresholds for display coloring.
pub mod display {
    /// Below this percentage a time-tracked batch is shown as early (dimmed).
    pub const PROGRESS_EARLY_PCT: f64 = 25.0;

    /// At or above this percentage a time-tracked batch is nearly done (green).
    pub const PROGRESS_NEARLY_DONE_PCT: f64 = 90.0;

    /// Weight loss at which cured products are usually ready (green).
    pub const TARGET_WEIGHT_LOSS_PCT: f64 = 30.0;
}
