use std::time::Duration;

use evs_core::{
    resolve, update, EvsError, OutputRecord, OutputUpdate, PollMsg, PollOutcome, PollPolicy,
    PollState,
};
use serde_json::json;

fn observed(status: &str, progress: f64) -> PollState {
    let (state, _) = update(
        PollState::new(PollPolicy::default()),
        PollMsg::StatusReceived {
            body: json!({ "status": status, "progress": progress }),
        },
    );
    state
}

fn timed_out(status: &str, progress: f64) -> PollState {
    let (state, _) = update(observed(status, progress), PollMsg::DeadlineReached);
    state
}

#[test]
fn success_reports_last_observation() {
    let report = resolve("srv-1", &observed("Completed", 100.0), Duration::from_secs(12), false)
        .expect("success");
    assert_eq!(report.outcome, PollOutcome::Success);
    assert_eq!(report.job_id, "srv-1");
    assert_eq!(report.status, "Completed");
    assert_eq!(report.progress, 100.0);
    assert_eq!(report.body, json!({ "status": "Completed", "progress": 100.0 }));
}

#[test]
fn failure_names_job_and_status() {
    let err = resolve("srv-1", &observed("Cancelled", 30.0), Duration::from_secs(3), false)
        .unwrap_err();
    assert_eq!(
        err,
        EvsError::JobFailed {
            job_id: "srv-1".into(),
            status: "Cancelled".into()
        }
    );
    assert!(err.to_string().contains("srv-1"));
}

#[test]
fn deadline_counts_as_success_by_default() {
    let report = resolve("srv-1", &timed_out("Running", 42.7), Duration::from_secs(5), false)
        .expect("timeout tolerated");
    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.status, "Running");
    assert_eq!(report.progress, 42.7);
}

#[test]
fn deadline_fails_when_configured() {
    let err = resolve("srv-1", &timed_out("Running", 42.7), Duration::from_millis(5_400), true)
        .unwrap_err();
    assert_eq!(
        err,
        EvsError::Timeout {
            elapsed_secs: 5,
            job_id: "srv-1".into(),
            status: "Running".into(),
            progress: 42,
        }
    );
}

#[test]
fn output_record_collects_every_update() {
    let state = timed_out("Running", 42.0);
    let mut record = OutputRecord::default();
    record.apply(&OutputUpdate::LiveProgress(42));
    record.apply(&state.final_update());

    assert_eq!(record.live_progress, Some(42));
    assert_eq!(record.job_status.as_deref(), Some("Running"));
    assert_eq!(record.job_progress, Some(42.0));
    assert_eq!(record.creation_status, None);

    let serialized = serde_json::to_value(&record).unwrap();
    assert_eq!(serialized["job_status"], json!("Running"));
    assert!(serialized.get("creation_status").is_none());
}
