//! Batch and stage lifecycle.
//!
//! Stages move strictly forward, `NotStarted -> Ongoing -> Completed`, and at
//! most one stage per batch is ongoing at any time.

mod controller;
mod locks;

pub use controller::{
    AppendedStage, BatchOverview, LifecycleController, NewBatch, ReminderOutcome, StageRemoval,
    StageTransition,
};
pub use locks::BatchLocks;
