mod cli;

use anyhow::Result;
use clap::Parser;
use ferment::commands::common::App;
use ferment::config::{Config, LogFormat};
use tracing_subscriber::EnvFilter;

use cli::dispatch::dispatch;
use cli::types::Cli;

fn init_tracing(config: &Config) {
    // RUST_LOG wins; command output goes to stdout, so logs stay on stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json")
        || config.log_format == LogFormat::Json;

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    init_tracing(&config);

    let app = App::open(config)?;
    dispatch(&app, cli.command)
}
