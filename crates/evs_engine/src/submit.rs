use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use evs_core::{parse_body, resolve_job_id, CreationOutputs, EvsError, JobRequest, OutputUpdate};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::time::Instant;

use crate::{EvsApi, HostSink};

/// Client-side job id: `{unix millis}-{8 random alphanumerics}`.
pub fn new_job_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Create the remote job.
///
/// The creation outputs reach the host before the status code is judged, so
/// a rejected request still leaves its status, headers and body visible.
pub async fn submit_job(
    api: &dyn EvsApi,
    base: &str,
    request: &JobRequest,
    started: Instant,
    sink: &dyn HostSink,
) -> Result<CreationOutputs, EvsError> {
    engine_info!(
        "Creating job client_id={} name={} target={}/{}",
        request.id,
        request.name,
        request.target_name,
        request.target_id
    );
    let response = api.create_job(base, &request.to_json()).await?;

    let body = parse_body(&response.body);
    let creation = CreationOutputs {
        status: response.status,
        headers: response.headers,
        job_id: resolve_job_id(&body, &request.id),
        body,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    sink.set_outputs(&OutputUpdate::Creation(creation.clone()));

    if creation.status >= 400 {
        engine_warn!(
            "Job creation rejected status={} url={}",
            creation.status,
            response.url
        );
        return Err(EvsError::Http {
            status: creation.status,
            url: response.url,
        });
    }

    engine_info!(
        "Job created job_id={} status={} elapsed_ms={}",
        creation.job_id,
        creation.status,
        creation.elapsed_ms
    );
    Ok(creation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_carry_timestamp_and_suffix() {
        let id = new_job_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn job_ids_differ_between_calls() {
        let ids: std::collections::HashSet<_> = (0..64).map(|_| new_job_id()).collect();
        assert_eq!(ids.len(), 64);
    }
}
