use serde_json::{Map, Value};

/// Best-effort body decoding: JSON when it parses, the raw text otherwise.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Job id from a creation response: `id`, then `jobId`, then the client id.
pub fn resolve_job_id(body: &Value, client_id: &str) -> String {
    as_object(body)
        .and_then(|object| {
            ["id", "jobId"]
                .iter()
                .find_map(|field| object.get(*field).and_then(id_text))
        })
        .unwrap_or_else(|| client_id.to_string())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fields of a status response; each is `None` when absent or unusable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusFields {
    pub status: Option<String>,
    pub progress: Option<f64>,
}

/// Extract status and progress, or `None` if the body is not a JSON object
/// (directly or as JSON-encoded text).
pub fn status_fields(body: &Value) -> Option<StatusFields> {
    let object = as_object(body)?;
    let status = ["status", "jobStatus", "state"]
        .iter()
        .find_map(|field| match object.get(*field)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    let progress = object.get("progress").and_then(progress_value);
    Some(StatusFields { status, progress })
}

fn progress_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.clamp(0.0, 100.0))
}

fn as_object(body: &Value) -> Option<Map<String, Value>> {
    match body {
        Value::Object(object) => Some(object.clone()),
        Value::String(text) => match serde_json::from_str(text).ok()? {
            Value::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_id_wins_over_client_id() {
        let body = json!({"id": "srv-1", "jobId": "other", "status": "EVS Checkin"});
        assert_eq!(resolve_job_id(&body, "client-1"), "srv-1");
    }

    #[test]
    fn job_id_field_is_second_choice() {
        assert_eq!(resolve_job_id(&json!({"jobId": 77}), "client-1"), "77");
        assert_eq!(resolve_job_id(&json!({"id": " ", "jobId": "j-2"}), "client-1"), "j-2");
    }

    #[test]
    fn string_bodies_are_parsed_before_lookup() {
        let body = Value::String(r#"{"id":"srv-9"}"#.to_string());
        assert_eq!(resolve_job_id(&body, "client-1"), "srv-9");
    }

    #[test]
    fn falls_back_to_client_id() {
        assert_eq!(resolve_job_id(&Value::Null, "client-1"), "client-1");
        assert_eq!(resolve_job_id(&parse_body("accepted"), "client-1"), "client-1");
    }

    #[test]
    fn parse_body_keeps_non_json_text() {
        assert_eq!(parse_body("<html>oops</html>"), json!("<html>oops</html>"));
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn status_fields_accept_numeric_strings_and_clamp() {
        let fields = status_fields(&json!({"status": "Running", "progress": "45.5%"})).unwrap();
        assert_eq!(fields.status.as_deref(), Some("Running"));
        assert_eq!(fields.progress, Some(45.5));

        let fields = status_fields(&json!({"progress": 250})).unwrap();
        assert_eq!(fields.status, None);
        assert_eq!(fields.progress, Some(100.0));
    }

    #[test]
    fn status_fields_ignore_unusable_progress() {
        let fields = status_fields(&json!({"state": "Queued", "progress": "soon"})).unwrap();
        assert_eq!(fields.status.as_deref(), Some("Queued"));
        assert_eq!(fields.progress, None);
    }

    #[test]
    fn non_object_bodies_have_no_fields() {
        assert_eq!(status_fields(&json!("gateway timeout")), None);
        assert_eq!(status_fields(&json!([1, 2])), None);
        assert_eq!(status_fields(&Value::Null), None);
    }
}
