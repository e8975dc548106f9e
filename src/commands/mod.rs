pub mod batch;
pub mod common;
pub mod dashboard;
pub mod display;
pub mod log;
pub mod recipes;
pub mod stage;
pub mod watch;
