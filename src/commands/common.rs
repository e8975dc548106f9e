//! Wiring shared by every command: config, store, reminder queue and the
//! lifecycle controller built on top of them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::lifecycle::LifecycleController;
use crate::notify::QueueDispatcher;
use crate::recipes::RecipeCatalog;
use crate::store::FileStore;

pub struct App {
    pub config: Config,
    pub controller: LifecycleController,
    pub reminders: Arc<QueueDispatcher>,
    pub catalog: RecipeCatalog,
}

impl App {
    pub fn open(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = FileStore::open(&config.data_dir).with_context(|| {
            format!("Failed to open data directory: {}", config.data_dir.display())
        })?;
        let reminders = Arc::new(
            QueueDispatcher::open(&config.data_dir, Arc::clone(&clock))
                .context("Failed to open reminder queue")?,
        );
        let catalog = RecipeCatalog::load(config.recipes_file.as_deref())?;
        let controller = LifecycleController::new(Arc::new(store), reminders.clone(), clock);

        tracing::debug!(data_dir = %config.data_dir.display(), "opened ferment data directory");
        Ok(Self {
            config,
            controller,
            reminders,
            catalog,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.controller.clock().now()
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", s.chars().take(keep).collect::<String>())
}
