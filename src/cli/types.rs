use clap::{Parser, Subcommand};
use ferment::validation::{clap_id_validator, clap_name_validator, clap_weight_validator};
use std::path::PathBuf;

pub use super::types_stage::StageCommands;

#[derive(Parser)]
#[command(name = "ferment")]
#[command(about = "Track fermentation and curing batches stage by stage", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Config file (default: <config dir>/ferment/config.toml, or $FERMENT_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides the config file and $FERMENT_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list and manage batches
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },

    /// Start, complete, remove or append stages
    Stage {
        #[command(subcommand)]
        command: StageCommands,
    },

    /// Record weigh-ins and photos
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Overview across all batches
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the recipe catalogue, or the stages of one product type
    Recipes {
        /// Product type to show
        product_type: Option<String>,
    },

    /// Deliver stage reminders as they come due (runs until Ctrl+C)
    Watch {
        /// Deliver what is due now and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Subcommand)]
pub enum BatchCommands {
    /// Create a batch, seeding stages from the product type's recipe
    Create {
        /// Batch name
        #[arg(value_parser = clap_name_validator)]
        name: String,

        /// Product type (salami, beer, kimchi, ...)
        #[arg(short = 't', long = "type", value_parser = clap_name_validator)]
        product_type: String,

        /// Start time, RFC 3339 (default: now)
        #[arg(long)]
        start: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// External scan code (QR or barcode label)
        #[arg(long, value_parser = clap_id_validator)]
        scan_code: Option<String>,

        /// Initial weight in grams
        #[arg(long, value_parser = clap_weight_validator)]
        weight: Option<f64>,

        /// Start without stages instead of using the recipe
        #[arg(long)]
        no_template: bool,
    },

    /// List batches (active only unless --all)
    List {
        #[arg(short, long)]
        all: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one batch by id or scan code
    Show {
        key: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Mark a batch finished without deleting it
    Finish {
        #[arg(value_parser = clap_id_validator)]
        batch_id: String,
    },

    /// Delete a batch with its stages and logs
    Delete {
        #[arg(value_parser = clap_id_validator)]
        batch_id: String,

        /// Delete even if the batch is still active
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// Record a weigh-in in grams
    Weight {
        #[arg(value_parser = clap_id_validator)]
        batch_id: String,

        #[arg(value_parser = clap_weight_validator)]
        grams: f64,

        /// Photo taken with the weigh-in
        #[arg(long)]
        photo: Option<String>,
    },

    /// Record a photo
    Photo {
        #[arg(value_parser = clap_id_validator)]
        batch_id: String,

        /// Path or URI of the photo
        path: String,
    },
}
