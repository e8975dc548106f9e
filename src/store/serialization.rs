//! Batch record serialization
//!
//! A batch file is markdown with YAML frontmatter holding the batch, its
//! stages and its logs, followed by a human-readable summary body. Only the
//! frontmatter is read back.

use serde::{Deserialize, Serialize};

use super::frontmatter::parse_from_markdown;
use crate::error::StoreError;
use crate::models::{current_stage, Batch, BatchLog, Stage, StageStatus};

/// Everything stored for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch: Batch,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub logs: Vec<BatchLog>,
}

impl BatchRecord {
    pub fn new(batch: Batch) -> Self {
        Self {
            batch,
            stages: Vec::new(),
            logs: Vec::new(),
        }
    }
}

pub fn parse_record_from_markdown(content: &str) -> Result<BatchRecord, StoreError> {
    parse_from_markdown(content, "batch record")
}

pub fn serialize_record_to_markdown(record: &BatchRecord) -> Result<String, StoreError> {
    let yaml = serde_yaml::to_string(record)?;
    let batch = &record.batch;

    let mut content = String::new();
    content.push_str("---\n");
    content.push_str(&yaml);
    content.push_str("---\n\n");

    content.push_str(&format!("# Batch: {}\n\n", batch.name));
    content.push_str(&format!("**Product**: {}\n\n", batch.product_type));
    content.push_str(&format!(
        "**Started**: {}\n\n",
        batch.start_date.format("%Y-%m-%d %H:%M")
    ));
    content.push_str(&format!(
        "**Current stage**: {}\n\n",
        current_stage(&record.stages)
    ));

    if !batch.notes.is_empty() {
        content.push_str(&format!("{}\n\n", batch.notes));
    }

    if !record.stages.is_empty() {
        let mut stages: Vec<&Stage> = record.stages.iter().collect();
        stages.sort_by_key(|s| s.order_index);

        content.push_str("## Stages\n\n");
        for stage in stages {
            let mark = match stage.status() {
                StageStatus::Completed => "x",
                StageStatus::Ongoing => "~",
                StageStatus::NotStarted => " ",
            };
            content.push_str(&format!(
                "- [{mark}] {} ({}h)\n",
                stage.name, stage.duration_hours
            ));
        }
        content.push('\n');
    }

    let weights: Vec<&BatchLog> = record.logs.iter().filter(|l| l.weight.is_some()).collect();
    if !weights.is_empty() {
        content.push_str("## Weigh-ins\n\n");
        for log in weights {
            if let Some(grams) = log.weight {
                content.push_str(&format!(
                    "- {}: {grams:.0} g\n",
                    log.timestamp.format("%Y-%m-%d %H:%M")
                ));
            }
        }
        content.push('\n');
    }

    Ok(content)
}
