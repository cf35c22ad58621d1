use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use evs_core::EvsError;
use reqwest::header::{HeaderMap, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::Url;
use serde_json::Value;

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// An HTTP exchange with the connector, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The three EVS Connector calls. Only transport failures are errors; HTTP
/// status codes are left for the caller to judge.
#[async_trait::async_trait]
pub trait EvsApi: Send + Sync {
    /// `POST {base}/job`
    async fn create_job(&self, base: &str, payload: &Value) -> Result<RawResponse, EvsError>;

    /// `GET {base}/job/status/{job_id}`, never served from a cache.
    async fn job_status(&self, base: &str, job_id: &str) -> Result<RawResponse, EvsError>;

    /// `POST {base}/job/stop/{job_id}`
    async fn stop_job(&self, base: &str, job_id: &str) -> Result<RawResponse, EvsError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: TransportSettings) -> Result<Self, EvsError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| EvsError::transport("(client setup)", err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl EvsApi for ReqwestApi {
    async fn create_job(&self, base: &str, payload: &Value) -> Result<RawResponse, EvsError> {
        let url = endpoint(base, &["job"])?;
        let body = serde_json::to_vec(payload)
            .map_err(|err| EvsError::transport(url.as_str(), err.to_string()))?;

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(body)
            .send()
            .await
            .map_err(|err| map_reqwest_error(&url, err))?;
        read_response(&url, response).await
    }

    async fn job_status(&self, base: &str, job_id: &str) -> Result<RawResponse, EvsError> {
        let mut url = endpoint(base, &["job", "status", job_id])?;
        url.query_pairs_mut()
            .append_pair("_", &Utc::now().timestamp_millis().to_string());

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, JSON)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|err| map_reqwest_error(&url, err))?;
        read_response(&url, response).await
    }

    async fn stop_job(&self, base: &str, job_id: &str) -> Result<RawResponse, EvsError> {
        let url = endpoint(base, &["job", "stop", job_id])?;
        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(|err| map_reqwest_error(&url, err))?;
        read_response(&url, response).await
    }
}

/// Append path segments to the API base; segments are percent-encoded.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, EvsError> {
    let mut url = Url::parse(base).map_err(|err| EvsError::transport(base, err.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| EvsError::transport(base, "base URL cannot carry a path"))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

async fn read_response(url: &Url, response: reqwest::Response) -> Result<RawResponse, EvsError> {
    let status = response.status().as_u16();
    let headers = header_map(response.headers());
    let body = response
        .text()
        .await
        .map_err(|err| map_reqwest_error(url, err))?;
    Ok(RawResponse {
        url: url.to_string(),
        status,
        headers,
        body,
    })
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

fn map_reqwest_error(url: &Url, err: reqwest::Error) -> EvsError {
    let message = if err.is_timeout() {
        format!("timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    EvsError::transport(url.as_str(), message)
}
