use thiserror::Error;

/// Everything that can end an invocation unsuccessfully.
///
/// Unparsable status bodies are not represented here: the poller keeps the
/// last good observation and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvsError {
    #[error("input `{field}` {message}")]
    Validation { field: String, message: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("job creation at {url} returned HTTP {status}")]
    Http { status: u16, url: String },
    #[error("job {job_id} ended with status `{status}`")]
    JobFailed { job_id: String, status: String },
    #[error(
        "job {job_id} did not finish within {elapsed_secs}s (last status `{status}`, progress {progress}%)"
    )]
    Timeout {
        elapsed_secs: u64,
        job_id: String,
        status: String,
        progress: u32,
    },
}

impl EvsError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// True for errors raised before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
