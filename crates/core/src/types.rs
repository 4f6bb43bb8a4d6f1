//! Request and response bodies of the caption service HTTP API.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::progress::JobProgress;

/// Request body for `POST /caption_directory`.
///
/// Built once per submission and never mutated after it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    /// Server-side directory whose images should be captioned.
    #[serde(rename = "directory")]
    pub directory_path: String,
    /// Model identifier as listed by `/available_models`.
    pub model: String,
    /// Prompt identifier as listed by `/available_prompts`.
    pub prompt: String,
    /// Free text appended to the selected prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_prompt: Option<String>,
}

impl JobRequest {
    pub fn new(
        directory_path: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            directory_path: directory_path.into(),
            model: model.into(),
            prompt: prompt.into(),
            append_prompt: None,
        }
    }

    /// Append extra prompt text; blank text is ignored.
    pub fn with_append_prompt(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.append_prompt = Some(text);
        }
        self
    }
}

/// Response of a successful `POST /caption_directory`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    /// Every file the job will process, in server order.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Response of a successful `GET /caption_directory_status`.
///
/// Every field is optional on the wire, and `null` reads the same as a
/// missing key, so that a partial payload still renders whatever it
/// carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed_files: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_files: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub captioned_files: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_count: u64,
    /// Raw per-file objects keyed by file name, in server order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_statuses: IndexMap<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl StatusReport {
    pub fn progress(&self) -> JobProgress {
        JobProgress {
            processed: self.processed_files,
            total: self.total_files,
            captioned: self.captioned_files,
            errors: self.error_count,
        }
    }
}

/// Body for `POST /load_model_service`.
#[derive(Debug, Clone, Serialize)]
pub struct LoadModelRequest<'a> {
    pub service_model: &'a str,
}

/// Plain `{message}` acknowledgement returned by the service control
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceMessage {
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /available_models`: model name to description.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailableModels {
    pub available_models: IndexMap<String, String>,
}

/// Response of `GET /available_prompts`: prompt name to prompt text.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailablePrompts {
    pub available_prompts: IndexMap<String, String>,
}

/// Body for `POST /caption` (single image).
#[derive(Debug, Clone, Serialize)]
pub struct CaptionFileRequest {
    pub image_path: String,
    /// Prompt text, not a prompt identifier.
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_prompt: Option<String>,
}

/// Response of `POST /caption`.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionFileResponse {
    pub caption: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_request_uses_server_field_names() {
        let req = JobRequest::new("/data/imgs", "m1", "p1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"directory": "/data/imgs", "model": "m1", "prompt": "p1"})
        );
    }

    #[test]
    fn job_request_includes_append_prompt_when_set() {
        let req = JobRequest::new("/d", "m", "p").with_append_prompt("no watermarks");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["append_prompt"], "no watermarks");
    }

    #[test]
    fn blank_append_prompt_is_dropped() {
        let req = JobRequest::new("/d", "m", "p").with_append_prompt("   ");
        assert!(req.append_prompt.is_none());
    }

    #[test]
    fn status_report_tolerates_missing_fields() {
        let report: StatusReport = serde_json::from_str(r#"{"total_files": 3}"#).unwrap();
        assert_eq!(report.total_files, 3);
        assert_eq!(report.processed_files, 0);
        assert!(report.file_statuses.is_empty());
    }

    #[test]
    fn status_report_reads_null_as_missing() {
        let report: StatusReport = serde_json::from_str(
            r#"{"processed_files": null, "total_files": 2, "captioned_files": 1,
                "error_count": null, "file_statuses": {"a.jpg": {}}}"#,
        )
        .unwrap();
        assert_eq!(report.processed_files, 0);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.file_statuses.len(), 1);

        let report: StatusReport =
            serde_json::from_str(r#"{"total_files": 2, "file_statuses": null}"#).unwrap();
        assert!(report.file_statuses.is_empty());
        assert_eq!(report.progress().summary(), "0 of 2 files processed");
    }

    #[test]
    fn status_report_still_rejects_wrong_types() {
        assert!(serde_json::from_str::<StatusReport>(r#"{"total_files": "two"}"#).is_err());
    }

    #[test]
    fn status_report_keeps_server_order() {
        let report: StatusReport = serde_json::from_str(
            r#"{"file_statuses": {"z.jpg": {}, "a.jpg": {}, "m.jpg": {}}}"#,
        )
        .unwrap();
        let names: Vec<&str> = report.file_statuses.keys().map(String::as_str).collect();
        assert_eq!(names, ["z.jpg", "a.jpg", "m.jpg"]);
    }
}
