//! Stage lifecycle commands
//! Usage: ferment stage [start|complete|remove|append]

use anyhow::Result;
use colored::Colorize;

use super::common::App;
use super::display::{format_optional_time, print_reminder, print_stage_line};
use crate::lifecycle::StageTransition;
use crate::models::{current_stage, BatchId, StageId};

pub fn start(app: &App, stage_id: &str) -> Result<StageTransition> {
    let transition = app.controller.start_stage(&StageId::from(stage_id))?;
    println!(
        "{} stage '{}' of batch '{}'",
        "Started".green().bold(),
        transition.stage.name,
        transition.batch.name
    );
    println!(
        "  Planned end: {}",
        format_optional_time(transition.stage.planned_end_time)
    );
    print_reminder(&transition.reminder);
    Ok(transition)
}

pub fn complete(app: &App, stage_id: &str) -> Result<StageTransition> {
    let transition = app.controller.complete_stage(&StageId::from(stage_id))?;
    println!(
        "{} stage '{}' of batch '{}'",
        "Completed".green().bold(),
        transition.stage.name,
        transition.batch.name
    );
    print_reminder(&transition.reminder);

    if transition.batch.active {
        let stages = app
            .controller
            .store()
            .stages_for_batch(&transition.batch.id)?;
        println!("  Next: {}", current_stage(&stages).label().cyan());
    } else {
        println!("  All stages done, batch finished");
    }
    Ok(transition)
}

pub fn remove(app: &App, stage_id: &str) -> Result<()> {
    let removal = app.controller.remove_stage(&StageId::from(stage_id))?;
    println!(
        "Removed stage '{}' from batch '{}'",
        removal.removed.name, removal.batch.name
    );
    for stage in &removal.remaining {
        print_stage_line(stage, app.now());
    }
    Ok(())
}

pub fn append(app: &App, batch_id: &str, name: &str, hours: u32) -> Result<()> {
    let appended = app
        .controller
        .append_stage(&BatchId::from(batch_id), name, hours)?;
    println!(
        "Appended stage '{}' to batch '{}'",
        appended.stage.name, appended.batch.name
    );
    print_stage_line(&appended.stage, app.now());
    Ok(())
}
