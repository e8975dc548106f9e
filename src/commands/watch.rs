//! Reminder loop
//! Usage: ferment watch [--once]
//!
//! Polls the reminder queue and delivers whatever has come due until Ctrl-C.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::common::App;
use crate::notify::{deliver, Notifier, TerminalNotifier};

const SLEEP_SLICE: Duration = Duration::from_millis(200);

pub fn execute(app: &App, once: bool) -> Result<()> {
    let rearmed = app.controller.rearm_reminders()?;
    tracing::info!(rearmed, "reminders re-armed for ongoing stages");

    let notifier = TerminalNotifier;
    if once {
        drain(app, &notifier)?;
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("Failed to set Ctrl+C handler")?;

    println!(
        "{} reminders every {}s (Ctrl+C to stop)",
        "Watching".bold().blue(),
        app.config.poll_interval_secs
    );

    while running.load(Ordering::SeqCst) {
        if let Err(e) = drain(app, &notifier) {
            tracing::warn!(error = %e, "failed to read reminder queue");
        }
        sleep_while_running(&running, app.config.poll_interval());
    }

    println!("Stopped watching");
    Ok(())
}

/// Deliver every due reminder. Returns how many were delivered.
pub fn drain(app: &App, notifier: &dyn Notifier) -> Result<usize> {
    let due = app
        .reminders
        .take_due(app.now())
        .context("Failed to read reminder queue")?;
    for payload in &due {
        deliver(notifier, payload);
    }
    Ok(due.len())
}

fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
