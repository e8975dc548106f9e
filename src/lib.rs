pub mod clock;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod planner;
pub mod progress;
pub mod recipes;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
