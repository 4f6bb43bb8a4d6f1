//! Per-file status as reported by the status endpoint.

use serde_json::Value;

use crate::error::json_text;

/// Label rendered for a file the server has not started yet.
pub const QUEUED_LABEL: &str = "Queued";

/// Status of one file, ordered by progress.
///
/// The variant is decided purely by which keys the raw payload carries;
/// the label text itself is opaque (success and error both arrive as
/// [`FileStatus::Terminal`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileStatus {
    #[default]
    Queued,
    InProgress {
        label: String,
    },
    Terminal {
        label: String,
        message: String,
    },
}

impl FileStatus {
    /// Interpret one raw `file_statuses` entry.
    ///
    /// Only key presence matters; a `null` value renders as an empty cell.
    /// Entries that are not JSON objects are treated as queued.
    pub fn from_raw(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::Queued;
        };
        let field = |key: &str| obj.get(key).map(cell_text);

        match (field("status"), field("message")) {
            (None, _) => Self::Queued,
            (Some(label), None) => Self::InProgress { label },
            (Some(label), Some(message)) => Self::Terminal { label, message },
        }
    }

    /// Text for the status column.
    pub fn label(&self) -> &str {
        match self {
            Self::Queued => QUEUED_LABEL,
            Self::InProgress { label } | Self::Terminal { label, .. } => label,
        }
    }

    /// Text for the detail column (empty unless terminal).
    pub fn detail(&self) -> &str {
        match self {
            Self::Terminal { message, .. } => message,
            _ => "",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => json_text(other),
    }
}
