pub mod dispatch;
pub mod types;
mod types_stage;
