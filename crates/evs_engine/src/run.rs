use engine_logging::{engine_error, engine_info, engine_warn};
use evs_core::{resolve, EvsError, JobRequest, NodeInputs, PollState, TransferReport};
use tokio::time::Instant;

use crate::{new_job_id, poll_job, submit_job, EvsApi, HostSink};

/// One node invocation: validate, create the job, poll it, resolve the outcome.
///
/// Outputs pushed to `sink` before a failure stay pushed; the returned error
/// only marks the invocation as failed.
pub async fn run_transfer(
    api: &dyn EvsApi,
    inputs: &NodeInputs,
    sink: &dyn HostSink,
) -> Result<TransferReport, EvsError> {
    let started = Instant::now();
    let base = inputs.validate()?;
    let request = JobRequest::from_inputs(new_job_id(), inputs);

    let creation = submit_job(api, &base, &request, started, sink).await?;
    let job_id = creation.job_id;

    let mut state = PollState::new(inputs.policy.clone());
    let polled = poll_job(api, &base, &job_id, inputs.timeout(), &mut state, sink).await;
    sink.set_outputs(&state.final_update());
    let result = polled
        .and_then(|()| resolve(&job_id, &state, started.elapsed(), inputs.timeout_as_failure));

    match &result {
        Ok(report) => engine_info!(
            "Transfer job_id={} outcome={:?} status={:?} progress={}",
            job_id,
            report.outcome,
            report.status,
            report.progress
        ),
        Err(err) => {
            engine_error!("Transfer job_id={} failed: {}", job_id, err);
            if inputs.policy.stop_on_failure {
                stop_best_effort(api, &base, &job_id).await;
            }
        }
    }
    result
}

/// Ask the connector to stop a job. Never fails: problems are only logged so
/// they cannot replace the error that triggered the stop.
pub async fn stop_best_effort(api: &dyn EvsApi, base: &str, job_id: &str) {
    match api.stop_job(base, job_id).await {
        Ok(response) if response.is_success() => {
            engine_info!("Stop requested for job_id={}", job_id);
        }
        Ok(response) => {
            engine_warn!(
                "Stop for job_id={} returned HTTP {}",
                job_id,
                response.status
            );
        }
        Err(err) => {
            engine_warn!("Stop for job_id={} failed: {}", job_id, err);
        }
    }
}
