//! Weigh-in and photo log commands

use anyhow::Result;

use super::common::App;
use super::display::progress_label;
use crate::models::BatchId;
use crate::progress::progress;

pub fn weight(app: &App, batch_id: &str, grams: f64, photo: Option<String>) -> Result<()> {
    let batch = app
        .controller
        .log_weight(&BatchId::from(batch_id), grams, photo)?;

    println!("Logged {grams:.0} g for batch '{}'", batch.name);
    println!("  Progress: {}", progress_label(&progress(&batch, app.now())));
    Ok(())
}

pub fn photo(app: &App, batch_id: &str, path: &str) -> Result<()> {
    let log = app.controller.log_photo(&BatchId::from(batch_id), path)?;
    println!(
        "Logged photo {} for batch {}",
        log.photo.as_deref().unwrap_or_default(),
        log.batch_id
    );
    Ok(())
}
