use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BatchId, LogId};

/// A timestamped observation attached to a batch. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLog {
    pub id: LogId,
    pub batch_id: BatchId,
    pub timestamp: DateTime<Utc>,
    /// Weight sample in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Reference to a photo (path or URI); the engine never opens it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl BatchLog {
    pub fn weight(batch_id: BatchId, timestamp: DateTime<Utc>, grams: f64) -> Self {
        Self {
            id: LogId::generate(),
            batch_id,
            timestamp,
            weight: Some(grams),
            photo: None,
        }
    }

    pub fn photo(batch_id: BatchId, timestamp: DateTime<Utc>, photo: String) -> Self {
        Self {
            id: LogId::generate(),
            batch_id,
            timestamp,
            weight: None,
            photo: Some(photo),
        }
    }

    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        if photo.is_some() {
            self.photo = photo;
        }
        self
    }
}
