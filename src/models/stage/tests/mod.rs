use chrono::{DateTime, TimeZone, Utc};

use crate::models::ids::BatchId;
use crate::models::stage::{Stage, StageStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn create_test_stage(status: StageStatus) -> Stage {
    let mut stage = Stage::new(BatchId::from("batch-1"), "Test Stage".to_string(), 36, 0);
    match status {
        StageStatus::NotStarted => {}
        StageStatus::Ongoing => stage.start_time = Some(t0()),
        StageStatus::Completed => {
            stage.start_time = Some(t0());
            stage.end_time = Some(t0());
        }
    }
    stage
}
