use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use evs_core::input_names;
use evs_engine::TransportSettings;

use crate::config_file::FileConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Submit a transfer job to an EVS Connector and wait for it to finish.
#[derive(Debug, Parser)]
#[command(name = "evs-transfer", version)]
pub struct Args {
    /// RON file with default inputs; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Connector host, e.g. http://evs-connector:8084
    #[arg(long)]
    pub host_url: Option<String>,
    #[arg(long)]
    pub target_name: Option<String>,
    #[arg(long)]
    pub target_id: Option<String>,
    #[arg(long)]
    pub file_path: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub metadata_set_name: Option<String>,
    /// JSON list of {"id","value"} objects or a JSON object.
    #[arg(long)]
    pub metadata: Option<String>,

    /// Seconds to wait for a terminal status [default: 60]
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<String>,
    /// Fail instead of succeeding when the timeout elapses.
    #[arg(long)]
    pub timeout_as_failure: bool,
    /// Seconds between status calls [default: 5]
    #[arg(long, value_name = "SECONDS")]
    pub poll_interval: Option<String>,
    /// Progress percentage that counts as done [default: 100]
    #[arg(long, value_name = "PERCENT")]
    pub done_progress: Option<String>,
    /// Status that counts as done; empty disables it [default: "EVS Checkin"]
    #[arg(long)]
    pub completion_status: Option<String>,
    /// Ask the connector to stop the job when the invocation fails.
    #[arg(long)]
    pub stop_on_failure: bool,

    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub connect_timeout: u64,
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub request_timeout: u64,

    /// Also write the final output record to this JSON file.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Named inputs as the host would expose them: config file first, flags on top.
    pub fn input_values(&self, file: Option<FileConfig>) -> BTreeMap<String, String> {
        let mut values = file.map(FileConfig::into_values).unwrap_or_default();

        let flags = [
            (input_names::HOST_URL, &self.host_url),
            (input_names::TARGET_NAME, &self.target_name),
            (input_names::TARGET_ID, &self.target_id),
            (input_names::FILE_PATH, &self.file_path),
            (input_names::PRIORITY, &self.priority),
            (input_names::METADATA_SET_NAME, &self.metadata_set_name),
            (input_names::METADATA, &self.metadata),
            (input_names::TIMEOUT, &self.timeout),
            (input_names::POLL_INTERVAL, &self.poll_interval),
            (input_names::DONE_PROGRESS, &self.done_progress),
            (input_names::COMPLETION_STATUS, &self.completion_status),
        ];
        for (name, value) in flags {
            if let Some(value) = value {
                values.insert(name.to_string(), value.clone());
            }
        }
        if self.timeout_as_failure {
            values.insert(input_names::TIMEOUT_AS_FAILURE.to_string(), "true".into());
        }
        if self.stop_on_failure {
            values.insert(input_names::STOP_ON_FAILURE.to_string(), "true".into());
        }
        values
    }

    pub fn transport(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}
