use serde::Serialize;
use serde_json::{Map, Value};

use crate::NodeInputs;

/// Path segment every EVS Connector endpoint lives under.
pub const API_ROOT: &str = "/api";

/// Job name used when a file path has no usable segment at all.
pub const DEFAULT_JOB_NAME: &str = "job";

/// Normalize a host URL into the API base: `{scheme}://{host}[/prefix]/api`.
///
/// Trailing slashes are stripped. An existing `/api` segment is kept and
/// anything after it is dropped; otherwise the segment is appended.
pub fn normalize_base(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let start = path_start(trimmed);
    let lowered = trimmed.to_ascii_lowercase();

    for (offset, _) in lowered[start..].match_indices(API_ROOT) {
        let end = start + offset + API_ROOT.len();
        let at_boundary = matches!(lowered.as_bytes().get(end), None | Some(b'/'));
        if at_boundary {
            return trimmed[..end].to_string();
        }
    }

    format!("{trimmed}{API_ROOT}")
}

// Byte offset where the path begins, so a host literally named `api` is never
// mistaken for the root segment.
fn path_start(url: &str) -> usize {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    url[after_scheme..]
        .find('/')
        .map(|i| after_scheme + i)
        .unwrap_or(url.len())
}

/// Last non-empty segment of a `/` or `\` separated path.
pub fn job_name_from_path(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|segment| !segment.trim().is_empty())
        .last()
        .map(|segment| segment.trim().to_string())
        .unwrap_or_else(|| {
            let literal = path.trim();
            if literal.is_empty() {
                DEFAULT_JOB_NAME.to_string()
            } else {
                literal.to_string()
            }
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub id: String,
    pub value: String,
}

/// The two shapes the host may supply metadata in.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataInput {
    /// `[{"id": "...", "value": ...}, ...]`
    List(Vec<Value>),
    /// `{"key": value, ...}`
    Map(Map<String, Value>),
}

impl MetadataInput {
    /// Returns `None` for blank input, malformed JSON or a JSON scalar.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(raw).ok()? {
            Value::Array(items) => Some(Self::List(items)),
            Value::Object(map) => Some(Self::Map(map)),
            _ => None,
        }
    }

    pub fn into_entries(self) -> Vec<MetadataEntry> {
        match self {
            Self::List(items) => items.iter().filter_map(list_entry).collect(),
            Self::Map(map) => map
                .into_iter()
                .filter(|(key, _)| !key.trim().is_empty())
                .map(|(key, value)| MetadataEntry {
                    id: key,
                    value: value_text(&value),
                })
                .collect(),
        }
    }
}

/// Parse host metadata text into the canonical entry list.
///
/// Never fails: anything unusable means the payload carries no metadata.
pub fn parse_metadata(raw: &str) -> Option<Vec<MetadataEntry>> {
    let entries = MetadataInput::parse(raw)?.into_entries();
    (!entries.is_empty()).then_some(entries)
}

fn list_entry(item: &Value) -> Option<MetadataEntry> {
    let object = item.as_object()?;
    let id = ["id", "key", "name"]
        .iter()
        .find_map(|field| object.get(*field).and_then(key_text))?;
    let value = object.get("value").map(value_text).unwrap_or_default();
    Some(MetadataEntry { id, value })
}

fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Job-creation payload sent to `POST {base}/job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub id: String,
    pub name: String,
    pub target_name: String,
    pub target_id: String,
    #[serde(rename = "fileToTransfer")]
    pub file_path: String,
    #[serde(rename = "xsquarePriority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(rename = "metadatasetName", skip_serializing_if = "Option::is_none")]
    pub metadata_set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,
}

impl JobRequest {
    pub fn from_inputs(id: impl Into<String>, inputs: &NodeInputs) -> Self {
        let file_path = inputs.file_path.trim().to_string();
        Self {
            id: id.into(),
            name: job_name_from_path(&file_path),
            target_name: inputs.target_name.trim().to_string(),
            target_id: inputs.target_id.trim().to_string(),
            file_path,
            priority: non_blank(inputs.priority.as_deref()),
            metadata_set_name: non_blank(inputs.metadata_set_name.as_deref()),
            metadata: inputs.metadata.as_deref().and_then(parse_metadata),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
