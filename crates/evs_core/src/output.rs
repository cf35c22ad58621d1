use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// What the creation call left behind, recorded before its status is judged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreationOutputs {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub elapsed_ms: u64,
    pub job_id: String,
}

/// One push to the host's output setter.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputUpdate {
    Creation(CreationOutputs),
    LiveProgress(u32),
    Final {
        status: String,
        progress: f64,
        body: Value,
    },
}

/// The host-visible output set, keyed by the names the host binds.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OutputRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_progress: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_body: Option<Value>,
}

impl OutputRecord {
    pub fn apply(&mut self, update: &OutputUpdate) {
        match update {
            OutputUpdate::Creation(creation) => {
                self.creation_status = Some(creation.status);
                self.creation_headers = Some(creation.headers.clone());
                self.creation_body = Some(creation.body.clone());
                self.creation_elapsed_ms = Some(creation.elapsed_ms);
                self.job_id = Some(creation.job_id.clone());
            }
            OutputUpdate::LiveProgress(percent) => {
                self.live_progress = Some(*percent);
            }
            OutputUpdate::Final {
                status,
                progress,
                body,
            } => {
                self.job_status = Some(status.clone());
                self.job_progress = Some(*progress);
                self.poll_body = Some(body.clone());
            }
        }
    }
}
