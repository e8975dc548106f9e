pub mod batch;
pub mod batch_log;
pub mod constants;
pub mod ids;
pub mod stage;

pub use batch::{current_stage, Batch, CurrentStage};
pub use batch_log::BatchLog;
pub use ids::{BatchId, LogId, StageId};
pub use stage::{Stage, StageStatus};
