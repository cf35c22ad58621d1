#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use evs_core::{EvsError, NodeInputs, OutputRecord, OutputUpdate};
use evs_engine::{EvsApi, HostSink, RawResponse};
use serde_json::Value;
use tokio::time::Instant;

#[derive(Default)]
pub struct RecordingSink {
    progress: Mutex<Vec<u32>>,
    updates: Mutex<Vec<OutputUpdate>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Vec<u32> {
        self.progress.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<OutputUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn record(&self) -> OutputRecord {
        let mut record = OutputRecord::default();
        for update in self.updates.lock().unwrap().iter() {
            record.apply(update);
        }
        record
    }
}

impl HostSink for RecordingSink {
    fn report_progress(&self, percent: u32) {
        self.progress.lock().unwrap().push(percent);
    }

    fn set_outputs(&self, update: &OutputUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

pub fn inputs(host_url: &str) -> NodeInputs {
    NodeInputs {
        host_url: host_url.to_string(),
        target_name: "XSquare A".into(),
        target_id: "7".into(),
        file_path: "/media/ingest/clip.mxf".into(),
        ..NodeInputs::default()
    }
}

pub fn response(status: u16, body: &Value) -> RawResponse {
    RawResponse {
        url: "http://evs.test/api/job".into(),
        status,
        headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
        body: body.to_string(),
    }
}

/// Connector fake driven by a script of status responses. The last entry
/// repeats once the script runs out.
pub struct ScriptedApi {
    creation: Result<RawResponse, EvsError>,
    statuses: Vec<Result<RawResponse, EvsError>>,
    stop: Result<RawResponse, EvsError>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    poll_times: Mutex<Vec<Instant>>,
}

impl ScriptedApi {
    pub fn new(creation_status: u16, creation_body: Value) -> Self {
        Self {
            creation: Ok(response(creation_status, &creation_body)),
            statuses: Vec::new(),
            stop: Ok(response(200, &Value::Null)),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            poll_times: Mutex::new(Vec::new()),
        }
    }

    pub fn status(mut self, body: Value) -> Self {
        self.statuses.push(Ok(response(200, &body)));
        self
    }

    pub fn status_error(mut self) -> Self {
        self.statuses.push(Err(EvsError::transport(
            "http://evs.test/api/job/status",
            "connection reset",
        )));
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.stop = Err(EvsError::transport("http://evs.test/api/job/stop", "refused"));
        self
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EvsApi for ScriptedApi {
    async fn create_job(&self, _base: &str, _payload: &Value) -> Result<RawResponse, EvsError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.creation.clone()
    }

    async fn job_status(&self, _base: &str, _job_id: &str) -> Result<RawResponse, EvsError> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().unwrap().push(Instant::now());
        let index = call.min(self.statuses.len().saturating_sub(1));
        self.statuses
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(EvsError::transport("http://evs.test", "empty script")))
    }

    async fn stop_job(&self, _base: &str, _job_id: &str) -> Result<RawResponse, EvsError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stop.clone()
    }
}
