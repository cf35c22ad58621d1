use serde::Serialize;
use serde_json::Value;

use crate::{status_fields, OutputUpdate, PollPolicy};

/// Statuses that end polling successfully, compared case-insensitively.
pub const SUCCESS_STATUSES: &[&str] = &["COMPLETED", "SUCCESS", "SUCCESSFUL"];

/// Statuses that end polling with a job failure, compared case-insensitively.
pub const FAILURE_STATUSES: &[&str] = &["FAILED", "CANCELED", "CANCELLED"];

/// Last good observation of the remote job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollSnapshot {
    pub status: String,
    /// 0 to 100.
    pub progress: f64,
}

impl PollSnapshot {
    /// Progress as a floored whole percentage.
    pub fn percent(&self) -> u32 {
        self.progress.floor().clamp(0.0, 100.0) as u32
    }
}

impl Default for PollSnapshot {
    fn default() -> Self {
        Self {
            status: String::new(),
            progress: 0.0,
        }
    }
}

/// Why polling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Succeeded,
    Failed,
    DeadlineReached,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollMsg {
    /// One status response, already decoded with [`crate::parse_body`].
    StatusReceived { body: Value },
    /// The status call answered with a non-success HTTP code.
    StatusUnavailable { body: Value },
    /// The caller's deadline passed before a terminal status was seen.
    DeadlineReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEffect {
    /// Floored progress rose since the last report.
    ReportProgress(u32),
    Finish(PollExit),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    policy: PollPolicy,
    snapshot: PollSnapshot,
    last_body: Value,
    last_reported: u32,
    cycles: u32,
    exit: Option<PollExit>,
}

impl PollState {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            snapshot: PollSnapshot::default(),
            last_body: Value::Null,
            last_reported: 0,
            cycles: 0,
            exit: None,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn snapshot(&self) -> &PollSnapshot {
        &self.snapshot
    }

    /// Raw body of the most recent status response.
    pub fn last_body(&self) -> &Value {
        &self.last_body
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn exit(&self) -> Option<PollExit> {
        self.exit
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    /// Output update carrying the latest observation, whatever the outcome.
    pub fn final_update(&self) -> OutputUpdate {
        OutputUpdate::Final {
            status: self.snapshot.status.clone(),
            progress: self.snapshot.progress,
            body: self.last_body.clone(),
        }
    }

    /// In-place form of [`update`], for loops that must keep the state even
    /// when they bail out between messages.
    pub fn apply(&mut self, msg: PollMsg) -> Vec<PollEffect> {
        if self.is_finished() {
            return Vec::new();
        }

        match msg {
            PollMsg::StatusReceived { body } => {
                self.observe(body);
                let mut effects = Vec::with_capacity(2);
                let percent = self.snapshot.percent();
                if percent > self.last_reported {
                    self.last_reported = percent;
                    effects.push(PollEffect::ReportProgress(percent));
                }
                if let Some(exit) = classify(&self.snapshot, &self.policy) {
                    effects.push(self.finish(exit));
                }
                effects
            }
            PollMsg::StatusUnavailable { body } => {
                self.cycles += 1;
                self.last_body = body;
                Vec::new()
            }
            PollMsg::DeadlineReached => vec![self.finish(PollExit::DeadlineReached)],
        }
    }

    fn observe(&mut self, body: Value) {
        self.cycles += 1;
        if let Some(fields) = status_fields(&body) {
            if let Some(status) = fields.status {
                self.snapshot.status = status;
            }
            if let Some(progress) = fields.progress {
                self.snapshot.progress = progress;
            }
        }
        self.last_body = body;
    }

    fn finish(&mut self, exit: PollExit) -> PollEffect {
        self.exit = Some(exit);
        PollEffect::Finish(exit)
    }
}

/// Pure update function: applies one poll message and returns the effects the
/// poll loop must carry out. Messages after a finish are ignored.
pub fn update(mut state: PollState, msg: PollMsg) -> (PollState, Vec<PollEffect>) {
    let effects = state.apply(msg);
    (state, effects)
}

/// Terminal decision for one snapshot. Failure statuses win over progress.
pub fn classify(snapshot: &PollSnapshot, policy: &PollPolicy) -> Option<PollExit> {
    let status = snapshot.status.trim();
    let is_one_of = |vocabulary: &[&str]| {
        vocabulary
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(status))
    };

    if is_one_of(FAILURE_STATUSES) {
        return Some(PollExit::Failed);
    }
    let completion_matches = policy
        .completion_status
        .as_deref()
        .map(str::trim)
        .is_some_and(|expected| !expected.is_empty() && expected.eq_ignore_ascii_case(status));
    if completion_matches || is_one_of(SUCCESS_STATUSES) || snapshot.percent() >= policy.done_progress
    {
        return Some(PollExit::Succeeded);
    }
    None
}
