use clap::Subcommand;
use ferment::validation::{clap_hours_validator, clap_id_validator, clap_name_validator};

#[derive(Subcommand)]
pub enum StageCommands {
    /// Start a not-started stage (one ongoing stage per batch)
    Start {
        #[arg(value_parser = clap_id_validator)]
        stage_id: String,
    },

    /// Complete the ongoing stage
    Complete {
        #[arg(value_parser = clap_id_validator)]
        stage_id: String,
    },

    /// Remove a stage that has not started yet
    Remove {
        #[arg(value_parser = clap_id_validator)]
        stage_id: String,
    },

    /// Add a stage after the last one
    Append {
        #[arg(value_parser = clap_id_validator)]
        batch_id: String,

        #[arg(value_parser = clap_name_validator)]
        name: String,

        /// Planned duration in hours
        #[arg(value_parser = clap_hours_validator)]
        hours: u32,
    },
}
