use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::{normalize_base, EvsError};

/// Input names as the hosting workflow engine exposes them.
pub mod input_names {
    pub const HOST_URL: &str = "Host URL";
    pub const TARGET_NAME: &str = "Target Name";
    pub const TARGET_ID: &str = "Target ID";
    pub const FILE_PATH: &str = "File Path";
    pub const PRIORITY: &str = "Priority";
    pub const METADATA_SET_NAME: &str = "Metadata Set Name";
    pub const METADATA: &str = "Metadata";
    pub const TIMEOUT: &str = "Timeout";
    pub const TIMEOUT_AS_FAILURE: &str = "Timeout As Failure";
    pub const POLL_INTERVAL: &str = "Poll Interval";
    pub const DONE_PROGRESS: &str = "Done Progress";
    pub const COMPLETION_STATUS: &str = "Completion Status";
    pub const STOP_ON_FAILURE: &str = "Stop On Failure";
}

/// Read access to the host's named inputs.
pub trait InputSource {
    fn get(&self, name: &str) -> Option<String>;
}

impl InputSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl InputSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// When the remote job counts as finished, and how often to ask.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Floored progress at or above which the job is done.
    pub done_progress: u32,
    /// Service-specific status that also means done; `None` disables it.
    pub completion_status: Option<String>,
    /// Ask the service to stop the job when the invocation fails after submission.
    pub stop_on_failure: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            done_progress: 100,
            completion_status: Some("EVS Checkin".to_string()),
            stop_on_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInputs {
    pub host_url: String,
    pub target_name: String,
    pub target_id: String,
    pub file_path: String,
    pub priority: Option<String>,
    pub metadata_set_name: Option<String>,
    /// Raw JSON text, parsed leniently when the payload is built.
    pub metadata: Option<String>,
    pub timeout_secs: u64,
    pub timeout_as_failure: bool,
    pub policy: PollPolicy,
}

impl Default for NodeInputs {
    fn default() -> Self {
        Self {
            host_url: String::new(),
            target_name: String::new(),
            target_id: String::new(),
            file_path: String::new(),
            priority: None,
            metadata_set_name: None,
            metadata: None,
            timeout_secs: 60,
            timeout_as_failure: false,
            policy: PollPolicy::default(),
        }
    }
}

impl NodeInputs {
    /// Collect inputs from the host. Required fields are checked later by
    /// [`NodeInputs::validate`]; malformed optional knobs fail here.
    pub fn from_source(source: &dyn InputSource) -> Result<Self, EvsError> {
        use input_names::*;

        let defaults = Self::default();
        let text = |name: &str| source.get(name).unwrap_or_default();
        let optional = |name: &str| {
            source
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut policy = defaults.policy.clone();
        if let Some(raw) = optional(POLL_INTERVAL) {
            policy.interval = parse_interval(POLL_INTERVAL, &raw)?;
        }
        if let Some(raw) = optional(DONE_PROGRESS) {
            policy.done_progress = parse_done_progress(&raw)?;
        }
        if let Some(raw) = source.get(COMPLETION_STATUS) {
            let raw = raw.trim();
            policy.completion_status = (!raw.is_empty()).then(|| raw.to_string());
        }
        if let Some(raw) = optional(STOP_ON_FAILURE) {
            policy.stop_on_failure = parse_flag(STOP_ON_FAILURE, &raw)?;
        }

        Ok(Self {
            host_url: text(HOST_URL),
            target_name: text(TARGET_NAME),
            target_id: text(TARGET_ID),
            file_path: text(FILE_PATH),
            priority: optional(PRIORITY),
            metadata_set_name: optional(METADATA_SET_NAME),
            metadata: optional(METADATA),
            timeout_secs: match optional(TIMEOUT) {
                Some(raw) => raw.parse().map_err(|_| {
                    EvsError::validation(TIMEOUT, format!("`{raw}` is not a whole number of seconds"))
                })?,
                None => defaults.timeout_secs,
            },
            timeout_as_failure: match optional(TIMEOUT_AS_FAILURE) {
                Some(raw) => parse_flag(TIMEOUT_AS_FAILURE, &raw)?,
                None => defaults.timeout_as_failure,
            },
            policy,
        })
    }

    /// Check required inputs and return the normalized API base URL.
    pub fn validate(&self) -> Result<String, EvsError> {
        use input_names::*;

        let required = [
            (HOST_URL, &self.host_url),
            (TARGET_NAME, &self.target_name),
            (TARGET_ID, &self.target_id),
            (FILE_PATH, &self.file_path),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EvsError::validation(field, "is required"));
            }
        }

        let base = normalize_base(&self.host_url);
        let parsed = url::Url::parse(&base)
            .map_err(|err| EvsError::validation(HOST_URL, format!("`{base}`: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EvsError::validation(
                HOST_URL,
                format!("unsupported scheme `{}`", parsed.scheme()),
            ));
        }
        Ok(base)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, EvsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(EvsError::validation(field, format!("`{other}` is not a boolean"))),
    }
}

fn parse_interval(field: &str, raw: &str) -> Result<Duration, EvsError> {
    match raw.parse::<f64>() {
        Ok(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs).map_err(|_| {
            EvsError::validation(field, format!("`{raw}` is out of range"))
        }),
        _ => Err(EvsError::validation(field, format!("`{raw}` is not a positive number of seconds"))),
    }
}

fn parse_done_progress(raw: &str) -> Result<u32, EvsError> {
    match raw.parse::<u32>() {
        Ok(value @ 1..=100) => Ok(value),
        _ => Err(EvsError::validation(
            input_names::DONE_PROGRESS,
            format!("`{raw}` is not a percentage between 1 and 100"),
        )),
    }
}
