//! Integration tests for the batch/stage lifecycle
//!
//! These tests drive the public API end to end: planning, transitions,
//! reminders and the dashboard, against both store adapters.

pub mod file_store_flow;
pub mod helpers;
pub mod lifecycle_flow;
pub mod reminder_flow;
