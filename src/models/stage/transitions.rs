use super::types::StageStatus;
use crate::error::{Error, Result};

impl StageStatus {
    /// Check if transitioning from the current status to the new status is valid.
    ///
    /// Transitions are strictly forward and never skip a state:
    /// - `NotStarted` -> `Ongoing`
    /// - `Ongoing` -> `Completed`
    /// - `Completed` is a terminal state
    ///
    /// Re-entering the current status is not a valid transition.
    pub fn can_transition_to(&self, new_status: &StageStatus) -> bool {
        self.valid_transitions().contains(new_status)
    }

    /// Attempt to transition to a new status, returning `InvalidTransition` if invalid.
    pub fn try_transition(&self, new_status: StageStatus) -> Result<StageStatus> {
        if self.can_transition_to(&new_status) {
            Ok(new_status)
        } else {
            Err(Error::InvalidTransition(format!(
                "stage status {self} -> {new_status}"
            )))
        }
    }

    /// Returns the list of valid statuses this status can transition to.
    pub fn valid_transitions(&self) -> Vec<StageStatus> {
        match self {
            StageStatus::NotStarted => vec![StageStatus::Ongoing],
            StageStatus::Ongoing => vec![StageStatus::Completed],
            StageStatus::Completed => vec![], // Terminal state
        }
    }
}
