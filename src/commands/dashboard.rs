use anyhow::Result;
use colored::Colorize;

use super::common::App;
use super::display::{format_optional_time, format_time};
use crate::dashboard::{summarize, DashboardSummary, StageEvent};

pub fn execute(app: &App, json: bool) -> Result<DashboardSummary> {
    let summary = summarize(
        app.controller.store(),
        app.now(),
        app.config.recent_completions,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(summary);
    }

    println!("{}", "ferment dashboard".bold().blue());
    println!("{}", "=".repeat(40));
    println!("  Active batches:         {}", summary.active_batches);
    println!("  Stages done (7 days):   {}", summary.completed_last_7_days);
    match summary.average_weight_loss {
        Some(pct) => println!("  Average weight loss:    {pct:.2}%"),
        None => println!("  Average weight loss:    {}", "n/a".dimmed()),
    }

    println!("\n{}", "Next event".bold());
    match &summary.next_event {
        Some(event) => println!(
            "  {} ends {}",
            describe(event),
            format_optional_time(event.stage.planned_end_time).cyan()
        ),
        None => println!("  {}", "Nothing scheduled".dimmed()),
    }

    println!("\n{}", "Recently completed".bold());
    if summary.recent_completions.is_empty() {
        println!("  {}", "None yet".dimmed());
    }
    for event in &summary.recent_completions {
        let ended = event.stage.end_time.map(format_time).unwrap_or_default();
        println!("  {ended}  {}", describe(event));
    }
    println!();

    Ok(summary)
}

fn describe(event: &StageEvent) -> String {
    match &event.batch_name {
        Some(batch) => format!("{batch} / {}", event.stage.name),
        None => event.stage.name.clone(),
    }
}
