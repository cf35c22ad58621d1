use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use engine_logging::engine_info;
use evs_core::input_names;
use serde::Deserialize;

/// Inputs read from a RON file, e.g.
///
/// ```ron
/// (
///     host_url: Some("http://evs-connector:8084"),
///     target_name: Some("XSquare A"),
///     timeout_secs: Some(120),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host_url: Option<String>,
    pub target_name: Option<String>,
    pub target_id: Option<String>,
    pub file_path: Option<String>,
    pub priority: Option<String>,
    pub metadata_set_name: Option<String>,
    pub metadata: Option<String>,
    pub timeout_secs: Option<u64>,
    pub timeout_as_failure: Option<bool>,
    pub poll_interval_secs: Option<f64>,
    pub done_progress: Option<u32>,
    pub completion_status: Option<String>,
    pub stop_on_failure: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = ron::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        engine_info!("Loaded inputs from {:?}", path);
        Ok(config)
    }

    pub fn into_values(self) -> BTreeMap<String, String> {
        let entries = [
            (input_names::HOST_URL, self.host_url),
            (input_names::TARGET_NAME, self.target_name),
            (input_names::TARGET_ID, self.target_id),
            (input_names::FILE_PATH, self.file_path),
            (input_names::PRIORITY, self.priority),
            (input_names::METADATA_SET_NAME, self.metadata_set_name),
            (input_names::METADATA, self.metadata),
            (input_names::TIMEOUT, self.timeout_secs.map(|v| v.to_string())),
            (
                input_names::TIMEOUT_AS_FAILURE,
                self.timeout_as_failure.map(|v| v.to_string()),
            ),
            (
                input_names::POLL_INTERVAL,
                self.poll_interval_secs.map(|v| v.to_string()),
            ),
            (input_names::DONE_PROGRESS, self.done_progress.map(|v| v.to_string())),
            (input_names::COMPLETION_STATUS, self.completion_status),
            (input_names::STOP_ON_FAILURE, self.stop_on_failure.map(|v| v.to_string())),
        ];
        entries
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evs_core::NodeInputs;
    use tempfile::TempDir;

    #[test]
    fn loads_ron_and_feeds_node_inputs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("transfer.ron");
        fs::write(
            &path,
            r#"(
                host_url: Some("http://evs.local:8084"),
                target_name: Some("XSquare A"),
                target_id: Some("7"),
                file_path: Some("/media/clip.mxf"),
                metadata: Some("{\"show\":\"Sports\"}"),
                timeout_secs: Some(120),
                poll_interval_secs: Some(2.0),
                stop_on_failure: Some(true),
            )"#,
        )
        .unwrap();

        let values = FileConfig::load(&path).unwrap().into_values();
        let inputs = NodeInputs::from_source(&values).unwrap();

        assert_eq!(inputs.host_url, "http://evs.local:8084");
        assert_eq!(inputs.timeout_secs, 120);
        assert_eq!(inputs.policy.interval, std::time::Duration::from_secs(2));
        assert!(inputs.policy.stop_on_failure);
        assert_eq!(inputs.metadata.as_deref(), Some(r#"{"show":"Sports"}"#));
        assert_eq!(inputs.validate().unwrap(), "http://evs.local:8084/api");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(hots_url: Some(\"x\"))").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }
}
