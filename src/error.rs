//! Error taxonomy for the batch/stage engine.
//!
//! Transition and structural errors are reported synchronously to the caller.
//! Store errors propagate unchanged; the engine never retries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Illegal stage state change (completing a stage that is not ongoing,
    /// starting while another stage of the batch is ongoing, ...).
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Structurally disallowed action (removing a started stage, empty name, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Referenced batch or stage is absent from the store.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("record missing: {0}")]
    Missing(String),

    #[error("internal store error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("dispatcher unavailable: {0}")]
    Unavailable(String),

    #[error("dispatcher I/O error: {0}")]
    Io(String),

    #[error("dispatcher serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for DispatchError {
    fn from(err: serde_yaml::Error) -> Self {
        DispatchError::Serialization(err.to_string())
    }
}
