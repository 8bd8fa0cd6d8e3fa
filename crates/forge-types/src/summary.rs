use std::time::Duration;

use crate::target::TargetStatus;

/// One row of the end-of-run summary table.
#[derive(Debug, Clone)]
pub struct TargetSummary {
    pub name: String,
    pub status: TargetStatus,
    pub duration: Duration,
}

impl TargetSummary {
    /// Overall success iff every target is neither `Failed` nor `NotRun`.
    pub fn overall_success(rows: &[TargetSummary]) -> bool {
        rows.iter()
            .all(|r| !matches!(r.status, TargetStatus::Failed | TargetStatus::NotRun))
    }

    pub fn total_duration(rows: &[TargetSummary]) -> Duration {
        rows.iter().map(|r| r.duration).sum()
    }
}
