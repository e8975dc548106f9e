//! Terminal rendering helpers shared by the commands.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::lifecycle::{BatchOverview, ReminderOutcome};
use crate::models::constants::display::{
    PROGRESS_EARLY_PCT, PROGRESS_NEARLY_DONE_PCT, TARGET_WEIGHT_LOSS_PCT,
};
use crate::models::{Stage, StageStatus};
use crate::progress::Progress;

pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_optional_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(format_time).unwrap_or_else(|| "-".to_string())
}

/// `36h` below three days, `14d` (or `14d 6h`) above.
pub fn format_hours(hours: u64) -> String {
    if hours < 72 {
        return format!("{hours}h");
    }
    let (days, rest) = (hours / 24, hours % 24);
    if rest == 0 {
        format!("{days}d")
    } else {
        format!("{days}d {rest}h")
    }
}

pub fn status_label(status: StageStatus) -> ColoredString {
    match status {
        StageStatus::NotStarted => "not started".dimmed(),
        StageStatus::Ongoing => "ongoing".yellow(),
        StageStatus::Completed => "completed".green(),
    }
}

pub fn progress_label(progress: &Progress) -> ColoredString {
    let text = progress.to_string();
    let Some(pct) = progress.percent() else {
        return text.dimmed();
    };
    match progress {
        Progress::WeightLoss(_) if pct >= TARGET_WEIGHT_LOSS_PCT => text.green(),
        Progress::WeightLoss(_) => text.yellow(),
        _ if pct >= PROGRESS_NEARLY_DONE_PCT => text.green(),
        _ if pct < PROGRESS_EARLY_PCT => text.dimmed(),
        _ => text.yellow(),
    }
}

/// Time actually spent in a stage that has started, e.g. `spent 3d 4h`.
pub fn format_spent(stage: &Stage, now: DateTime<Utc>) -> Option<String> {
    let spent = stage.elapsed(now)?;
    let hours = u64::try_from(spent.num_hours()).unwrap_or(0);
    Some(format!("spent {}", format_hours(hours)))
}

pub fn print_stage_line(stage: &Stage, now: DateTime<Utc>) {
    let spent = format_spent(stage, now)
        .map(|s| format!("  {}", s.dimmed()))
        .unwrap_or_default();
    println!(
        "  {}. {:<28} {:>8}  {:<12} planned {} -> {}{spent}",
        stage.order_index + 1,
        stage.name,
        format_hours(u64::from(stage.duration_hours)),
        status_label(stage.status()),
        format_optional_time(stage.planned_start_time),
        format_optional_time(stage.planned_end_time),
    );
    println!("     {}", stage.id.as_str().dimmed());
}

pub fn print_overview(overview: &BatchOverview, now: DateTime<Utc>) {
    let batch = &overview.batch;
    let state = if batch.active {
        "active".green()
    } else {
        "finished".dimmed()
    };

    println!("{} {}", "Batch:".bold(), batch.name.bold());
    println!("  ID:       {}", batch.id);
    println!("  Type:     {}", batch.product_type);
    println!("  Started:  {}", format_time(batch.start_date));
    println!("  State:    {state}");
    if let Some(code) = &batch.scan_code {
        println!("  Scan:     {code}");
    }
    println!(
        "  Planned:  {}",
        format_optional_time(batch.planned_completion)
    );
    println!("  Current:  {}", overview.current_stage.label().cyan());
    println!("  Progress: {}", progress_label(&overview.progress));
    if let Some(current) = batch.current_weight {
        println!("  Weight:   {current:.0} g");
    }
    if !batch.notes.is_empty() {
        println!("  Notes:    {}", batch.notes);
    }

    if overview.stages.is_empty() {
        println!("\n  {}", "No stages".dimmed());
        return;
    }
    println!("\n{}", "Stages".bold());
    for stage in &overview.stages {
        print_stage_line(stage, now);
    }
}

/// Report what happened to a reminder. Failures are warnings; the stage
/// change itself already succeeded.
pub fn print_reminder(outcome: &ReminderOutcome) {
    match outcome {
        ReminderOutcome::Scheduled { delay, .. } => {
            let hours = delay.as_secs().div_ceil(3600);
            println!("  Reminder set for {} from now", format_hours(hours));
        }
        ReminderOutcome::Cancelled => println!("  Reminder cancelled"),
        ReminderOutcome::Skipped => {}
        ReminderOutcome::Failed(e) => {
            tracing::warn!(error = %e, "reminder request failed");
            println!("  {} reminder not updated: {e}", "Warning:".yellow().bold());
        }
    }
}
