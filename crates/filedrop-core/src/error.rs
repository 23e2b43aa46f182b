use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::whole_megabytes;
use crate::registry;

/// Why a file (or a whole batch) was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnsupportedType,
    FileTooLarge,
    ReadFailure,
    BatchLimitExceeded,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::UnsupportedType => "unsupported_type",
            RejectReason::FileTooLarge => "file_too_large",
            RejectReason::ReadFailure => "read_failure",
            RejectReason::BatchLimitExceeded => "batch_limit_exceeded",
        }
    }

    /// Only a batch limit rejection drops more than the one file.
    pub fn is_batch_level(&self) -> bool {
        matches!(self, RejectReason::BatchLimitExceeded)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected file together with the user-facing message for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub filename: String,
    pub reason: RejectReason,
    pub message: String,
}

impl Rejection {
    pub fn unsupported_type(filename: &str) -> Self {
        let supported = registry::allowed_display_names().join(", ");
        Self {
            filename: filename.to_string(),
            reason: RejectReason::UnsupportedType,
            message: format!(
                "Unsupported file type: {filename}. Only {supported} are supported."
            ),
        }
    }

    pub fn file_too_large(filename: &str, max_size: u64) -> Self {
        Self {
            filename: filename.to_string(),
            reason: RejectReason::FileTooLarge,
            message: format!(
                "File too large: {filename}. Maximum size is {}MB.",
                whole_megabytes(max_size)
            ),
        }
    }

    pub fn read_failure(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: RejectReason::ReadFailure,
            message: format!("Failed to read file: {filename}"),
        }
    }

    /// Batch-level rejection; `filename` is left empty.
    pub fn batch_limit(max_files: usize) -> Self {
        Self {
            filename: String::new(),
            reason: RejectReason::BatchLimitExceeded,
            message: format!("Maximum {max_files} files allowed per message."),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("batch of {requested} files exceeds remaining capacity of {remaining}")]
    BatchLimitExceeded { requested: usize, remaining: usize },

    #[error("duplicate attachment id: {0}")]
    DuplicateId(String),

    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IngestError {
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            IngestError::BatchLimitExceeded { .. } => Some(RejectReason::BatchLimitExceeded),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_lists_display_names() {
        let r = Rejection::unsupported_type("movie.mp4");
        assert_eq!(r.reason, RejectReason::UnsupportedType);
        assert!(r.message.starts_with("Unsupported file type: movie.mp4. Only PNG, JPEG"));
        assert!(r.message.ends_with(" are supported."));
        assert!(!r.message.contains("image/png"));
        assert_eq!(r.message.matches("TypeScript").count(), 1);
    }

    #[test]
    fn too_large_message_in_whole_megabytes() {
        let r = Rejection::file_too_large("big.png", 10 * 1024 * 1024);
        assert_eq!(r.message, "File too large: big.png. Maximum size is 10MB.");
    }

    #[test]
    fn batch_limit_is_batch_level() {
        let r = Rejection::batch_limit(20);
        assert!(r.reason.is_batch_level());
        assert_eq!(r.message, "Maximum 20 files allowed per message.");
        assert!(!RejectReason::ReadFailure.is_batch_level());
    }

    #[test]
    fn ingest_error_reason() {
        let e = IngestError::BatchLimitExceeded {
            requested: 5,
            remaining: 2,
        };
        assert_eq!(e.reason(), Some(RejectReason::BatchLimitExceeded));
        assert_eq!(
            e.to_string(),
            "batch of 5 files exceeds remaining capacity of 2"
        );
        assert_eq!(IngestError::DuplicateId("x".into()).reason(), None);
    }
}
