use anyhow::{bail, Result};
use colored::Colorize;

use super::common::App;
use super::display::format_hours;

/// List the catalogue, or the stages of one product type.
pub fn execute(app: &App, product_type: Option<&str>) -> Result<()> {
    let Some(product_type) = product_type else {
        for recipe in app.catalog.iter() {
            println!(
                "{:<14} {:<20} {} stages, {}",
                recipe.product_type.bold(),
                recipe.display_name,
                recipe.stages.len(),
                format_hours(recipe.total_hours())
            );
        }
        return Ok(());
    };

    let Some(recipe) = app.catalog.get(product_type) else {
        bail!("No recipe for product type '{product_type}'. Run `ferment recipes` to list them");
    };

    println!("{} ({})", recipe.display_name.bold(), recipe.product_type);
    for (index, stage) in recipe.stages.iter().enumerate() {
        println!(
            "  {}. {:<32} {}",
            index + 1,
            stage.name,
            format_hours(u64::from(stage.duration_hours))
        );
    }
    println!("  Total: {}", format_hours(recipe.total_hours()));
    Ok(())
}
