use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::{EvsError, PollExit, PollState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    Success,
    Failure,
    TimedOut,
}

impl PollOutcome {
    pub fn from_exit(exit: PollExit, timeout_as_failure: bool) -> Self {
        match exit {
            PollExit::Succeeded => Self::Success,
            PollExit::Failed => Self::Failure,
            PollExit::DeadlineReached if timeout_as_failure => Self::Failure,
            PollExit::DeadlineReached => Self::TimedOut,
        }
    }
}

/// Result of an invocation that completed normally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub job_id: String,
    /// `Success`, or `TimedOut` when the deadline is configured to count as success.
    pub outcome: PollOutcome,
    pub status: String,
    pub progress: f64,
    pub body: Value,
}

/// Map how polling stopped onto the invocation result.
pub fn resolve(
    job_id: &str,
    state: &PollState,
    elapsed: Duration,
    timeout_as_failure: bool,
) -> Result<TransferReport, EvsError> {
    let snapshot = state.snapshot();
    let report = |outcome| TransferReport {
        job_id: job_id.to_string(),
        outcome,
        status: snapshot.status.clone(),
        progress: snapshot.progress,
        body: state.last_body().clone(),
    };

    // A state that never finished is treated as having run out of time.
    let exit = state.exit().unwrap_or(PollExit::DeadlineReached);
    match PollOutcome::from_exit(exit, timeout_as_failure) {
        PollOutcome::Failure if exit == PollExit::Failed => Err(EvsError::JobFailed {
            job_id: job_id.to_string(),
            status: snapshot.status.clone(),
        }),
        PollOutcome::Failure => Err(EvsError::Timeout {
            elapsed_secs: elapsed.as_secs(),
            job_id: job_id.to_string(),
            status: snapshot.status.clone(),
            progress: snapshot.percent(),
        }),
        outcome => Ok(report(outcome)),
    }
}
