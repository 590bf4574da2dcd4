//! Status line shown under the drop target.

use crate::constants::messages;
use crate::error::SnapError;

/// Visual class of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Work in progress, no styling
    Pending,
    Success,
    Error,
}

impl StatusKind {
    /// CSS class applied to the status element.
    pub fn class_name(&self) -> &'static str {
        match self {
            StatusKind::Pending => "",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }
}

/// Text and class of the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Pending,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    /// Status for a failed upload. Validation errors are shown verbatim.
    pub fn upload_failed(error: &SnapError) -> Self {
        match error {
            SnapError::NotAnImage { .. } => Self::error(error.to_string()),
            _ => Self::error(format!("{}: {}", messages::UPLOAD_FAILED, error)),
        }
    }

    /// Status for a failed delete.
    pub fn delete_failed(error: &SnapError) -> Self {
        Self::error(format!("{}: {}", messages::DELETE_FAILED, error))
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(Status::pending(messages::UPLOADING).kind.class_name(), "");
        assert_eq!(Status::success("ok").kind.class_name(), "success");
        assert_eq!(Status::error("no").kind.class_name(), "error");
    }

    #[test]
    fn test_failure_wording() {
        let status = Status::upload_failed(&SnapError::HttpStatus { status: 413 });
        assert_eq!(status.text, "Upload failed: HTTP error! status: 413");
        assert!(status.is_error());

        let status = Status::upload_failed(&SnapError::NotAnImage {
            mime_type: "text/plain".to_string(),
        });
        assert_eq!(status.text, "Please drop an image file");

        let status = Status::delete_failed(&SnapError::Rejected {
            message: "File not found".to_string(),
        });
        assert_eq!(status.text, "Delete failed: File not found");
    }
}
