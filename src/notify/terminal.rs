use colored::Colorize;

use super::{NotificationId, Notifier};
use crate::models::BatchId;

/// Prints reminders to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, body: &str, notification_id: &NotificationId, batch_id: &BatchId) {
        tracing::info!(%notification_id, %batch_id, title, "delivering reminder");
        println!("{} {}", "Reminder:".yellow().bold(), title.bold());
        println!("  {body}");
        println!("  {} {}", "batch:".dimmed(), batch_id.as_str().dimmed());
    }
}
