//! Decoding of failure bodies returned by the caption service.
//!
//! The service reports failures in three shapes: a JSON object with a
//! `detail` field (FastAPI `HTTPException`), a JSON object with a
//! `message` field, or a non-JSON text body (proxy pages, tracebacks).
//! [`ErrorBody::decode`] classifies a body into exactly one of them.

use std::fmt;

use serde_json::Value;

/// Text surfaced when a failed status check carries no `detail`.
pub const STATUS_FETCH_FAILED: &str = "Failed to fetch job status";

/// A classified failure body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// JSON object carrying a `detail` field.
    Detail(String),
    /// JSON object carrying a `message` field but no `detail`.
    Message(String),
    /// Anything else, kept verbatim.
    Text(String),
}

impl ErrorBody {
    /// Classify a failure body.
    ///
    /// Only bodies whose content type mentions `application/json` are
    /// parsed. JSON with `detail` wins over JSON with `message`; every
    /// other body (including unparseable JSON) falls back to raw text.
    pub fn decode(content_type: Option<&str>, body: &str) -> Self {
        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            return Self::Text(body.to_string());
        }

        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                if let Some(detail) = map.get("detail") {
                    Self::Detail(json_text(detail))
                } else if let Some(message) = map.get("message") {
                    Self::Message(json_text(message))
                } else {
                    Self::Text(body.to_string())
                }
            }
            _ => Self::Text(body.to_string()),
        }
    }

    /// The human-readable text of this body, whatever its shape.
    pub fn text(&self) -> &str {
        match self {
            Self::Detail(text) | Self::Message(text) | Self::Text(text) => text,
        }
    }

    /// The `detail` field, if the body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Detail(detail) => Some(detail),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Render a JSON value as display text: strings verbatim, anything else
/// as its JSON encoding.
pub(crate) fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
