use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use evs_core::{parse_body, EvsError, OutputUpdate, PollEffect, PollExit, PollMsg, PollState};
use tokio::time::{sleep, Instant};

use crate::{EvsApi, HostSink};

/// Poll `job_id` until a terminal status or until `timeout` has elapsed.
///
/// Each cycle is one status call followed by a sleep of `policy.interval`,
/// shortened so the loop never sleeps past the deadline. A timeout too large
/// to place on the clock means no deadline. A transport error aborts polling;
/// `state` keeps everything observed up to that point.
pub async fn poll_job(
    api: &dyn EvsApi,
    base: &str,
    job_id: &str,
    timeout: Duration,
    state: &mut PollState,
    sink: &dyn HostSink,
) -> Result<(), EvsError> {
    let deadline = Instant::now().checked_add(timeout);
    engine_info!(
        "Polling job_id={} interval_ms={} timeout_s={}",
        job_id,
        state.policy().interval.as_millis(),
        timeout.as_secs()
    );

    loop {
        let response = api.job_status(base, job_id).await?;
        let body = parse_body(&response.body);
        let msg = if response.is_success() {
            PollMsg::StatusReceived { body }
        } else {
            engine_warn!(
                "Status call for job_id={} returned HTTP {}",
                job_id,
                response.status
            );
            PollMsg::StatusUnavailable { body }
        };

        let effects = state.apply(msg);
        engine_debug!(
            "job_id={} cycle={} status={:?} progress={}",
            job_id,
            state.cycles(),
            state.snapshot().status,
            state.snapshot().progress
        );
        run_effects(job_id, &effects, sink);
        if state.is_finished() {
            return Ok(());
        }

        let interval = state.policy().interval;
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    let effects = state.apply(PollMsg::DeadlineReached);
                    run_effects(job_id, &effects, sink);
                    return Ok(());
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        sleep(pause).await;
    }
}

fn run_effects(job_id: &str, effects: &[PollEffect], sink: &dyn HostSink) {
    for effect in effects {
        match effect {
            PollEffect::ReportProgress(percent) => {
                engine_info!("job_id={} progress={}%", job_id, percent);
                sink.report_progress(*percent);
                sink.set_outputs(&OutputUpdate::LiveProgress(*percent));
            }
            PollEffect::Finish(PollExit::DeadlineReached) => {
                engine_warn!("job_id={} deadline reached before a terminal status", job_id);
            }
            PollEffect::Finish(exit) => {
                engine_info!("job_id={} finished: {:?}", job_id, exit);
            }
        }
    }
}
