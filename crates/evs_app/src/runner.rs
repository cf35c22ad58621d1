use anyhow::bail;
use engine_logging::{engine_info, engine_warn};
use evs_core::{EvsError, NodeInputs, OutputRecord, PollOutcome, TransferReport};
use evs_engine::{EngineEvent, EngineHandle, InvocationId};
use serde::Serialize;

const INVOCATION: InvocationId = 1;

/// What the command prints: the host's output set plus how the invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub outcome: PollOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outputs: OutputRecord,
}

impl RunSummary {
    pub fn new(outputs: OutputRecord, result: &Result<TransferReport, EvsError>) -> Self {
        match result {
            Ok(report) => Self {
                outcome: report.outcome,
                error: None,
                outputs,
            },
            Err(err) => Self {
                outcome: PollOutcome::Failure,
                error: Some(err.to_string()),
                outputs,
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one invocation on the engine and fold its events into an output record.
pub fn run_invocation(engine: &EngineHandle, inputs: NodeInputs) -> anyhow::Result<RunSummary> {
    if !engine.submit(INVOCATION, inputs) {
        bail!("engine is not running");
    }

    let mut outputs = OutputRecord::default();
    while let Some(event) = engine.recv() {
        match event {
            EngineEvent::Progress { percent, .. } => {
                engine_info!("Transfer progress {}%", percent);
            }
            EngineEvent::Outputs { update, .. } => outputs.apply(&update),
            EngineEvent::Completed { result, .. } => {
                if let Err(err) = &result {
                    engine_warn!("Transfer failed: {}", err);
                }
                return Ok(RunSummary::new(outputs, &result));
            }
        }
    }
    bail!("engine stopped before the transfer completed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_run_keeps_outputs_and_error() {
        let mut outputs = OutputRecord::default();
        outputs.creation_status = Some(500);
        let result = Err(EvsError::Http {
            status: 500,
            url: "http://evs.local/api/job".into(),
        });

        let summary = RunSummary::new(outputs, &result);

        assert!(!summary.succeeded());
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["outcome"], json!("failure"));
        assert_eq!(value["outputs"]["creation_status"], json!(500));
        assert!(value["error"].as_str().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn tolerated_timeout_is_a_success() {
        let report = TransferReport {
            job_id: "srv-1".into(),
            outcome: PollOutcome::TimedOut,
            status: "Running".into(),
            progress: 40.0,
            body: json!({ "status": "Running" }),
        };
        let summary = RunSummary::new(OutputRecord::default(), &Ok(report));
        assert!(summary.succeeded());
        assert_eq!(summary.outcome, PollOutcome::TimedOut);
    }
}
