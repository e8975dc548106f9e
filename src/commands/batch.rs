//! Batch commands
//! Usage: ferment batch [create|list|show|finish|delete]

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;

use super::common::{truncate, App};
use super::display::{format_optional_time, format_time, print_overview, progress_label};
use crate::lifecycle::{BatchOverview, NewBatch};
use crate::models::BatchId;

pub struct CreateArgs {
    pub name: String,
    pub product_type: String,
    pub start: Option<String>,
    pub notes: Option<String>,
    pub scan_code: Option<String>,
    pub weight: Option<f64>,
    pub no_template: bool,
}

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp '{value}', expected RFC 3339 (2024-03-01T08:00:00Z)"))
}

pub fn create(app: &App, args: CreateArgs) -> Result<BatchOverview> {
    let start = args.start.as_deref().map(parse_timestamp).transpose()?;
    let stages = if args.no_template {
        Vec::new()
    } else {
        app.catalog.seed_stages(&args.product_type)
    };
    if stages.is_empty() && !args.no_template {
        println!(
            "{} no recipe for '{}', batch starts without stages",
            "Note:".yellow(),
            args.product_type
        );
    }

    let overview = app.controller.create_batch(NewBatch {
        name: args.name,
        product_type: args.product_type,
        start,
        notes: args.notes.unwrap_or_default(),
        scan_code: args.scan_code,
        initial_weight: args.weight,
        stages,
    })?;

    println!("{} batch '{}'", "Created".green().bold(), overview.batch.name);
    print_overview(&overview, app.now());
    Ok(overview)
}

pub fn list(app: &App, all: bool, json: bool) -> Result<()> {
    let overviews = app.controller.overviews(all)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overviews)?);
        return Ok(());
    }

    if overviews.is_empty() {
        println!("No batches.");
        return Ok(());
    }

    println!(
        "{:<24} {:<12} {:<17} {:<24} {}",
        "NAME".bold(),
        "TYPE".bold(),
        "STARTED".bold(),
        "CURRENT STAGE".bold(),
        "PROGRESS".bold()
    );
    for overview in &overviews {
        let name = truncate(&overview.batch.name, 24);
        let name = if overview.batch.active {
            name.normal()
        } else {
            name.dimmed()
        };
        println!(
            "{:<24} {:<12} {:<17} {:<24} {}",
            name,
            truncate(&overview.batch.product_type, 12),
            format_time(overview.batch.start_date),
            truncate(overview.current_stage.label(), 24),
            progress_label(&overview.progress)
        );
    }
    Ok(())
}

pub fn show(app: &App, key: &str, json: bool) -> Result<()> {
    let batch = app.controller.find_batch(key)?;
    let overview = app.controller.overview(&batch.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    print_overview(&overview, app.now());

    let logs = app.controller.store().logs_for_batch(&batch.id)?;
    if !logs.is_empty() {
        println!("\n{}", "Log".bold());
        for log in logs {
            let weight = log
                .weight
                .map(|g| format!("{g:.0} g"))
                .unwrap_or_default();
            let photo = log.photo.as_deref().unwrap_or_default();
            println!("  {}  {weight:>8}  {photo}", format_time(log.timestamp));
        }
    }
    Ok(())
}

pub fn finish(app: &App, batch_id: &str) -> Result<()> {
    let batch = app.controller.finish_batch(&BatchId::from(batch_id))?;
    println!(
        "Batch '{}' finished (planned completion was {})",
        batch.name,
        format_optional_time(batch.planned_completion)
    );
    Ok(())
}

pub fn delete(app: &App, batch_id: &str, force: bool) -> Result<()> {
    let id = BatchId::from(batch_id);
    let overview = app.controller.overview(&id)?;
    if overview.batch.active && !force {
        bail!(
            "Batch '{}' is still active. Finish it first or pass --force",
            overview.batch.name
        );
    }

    app.controller.delete_batch(&id)?;
    println!("Deleted batch '{}'", overview.batch.name);
    Ok(())
}
