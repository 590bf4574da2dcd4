//! Error types for the upload and delete flows.

use thiserror::Error;

use crate::session::Phase;

/// Broad class of a [`SnapError`], used to pick log levels and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected locally, nothing was sent
    Validation,
    /// The request never produced a usable response
    Transport,
    /// The server answered and refused
    Application,
}

/// Errors that end an upload or delete operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapError {
    /// Selected file does not carry an `image/*` MIME type
    #[error("Please drop an image file")]
    NotAnImage {
        /// MIME type reported by the browser (may be empty)
        mime_type: String,
    },

    /// Fetch failed or the response body could not be read
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response without an error message in the body
    #[error("HTTP error! status: {status}")]
    HttpStatus {
        /// Response status code
        status: u16,
    },

    /// Server reported a failure
    #[error("{message}")]
    Rejected {
        /// Server-provided message, or a generic fallback
        message: String,
    },

    /// Upload reported success without naming the stored file
    #[error("Server response did not include a filename")]
    MissingFilename,

    /// 2xx upload response that is not the expected JSON
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

impl SnapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SnapError::NotAnImage { .. } => ErrorCategory::Validation,
            SnapError::Transport(_) => ErrorCategory::Transport,
            SnapError::HttpStatus { .. }
            | SnapError::Rejected { .. }
            | SnapError::MissingFilename
            | SnapError::MalformedResponse(_) => ErrorCategory::Application,
        }
    }
}

/// Why the controller refused to start an operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another operation holds the busy flag
    #[error("busy ({0:?} in progress)")]
    Busy(Phase),

    /// Delete requested with no image on display
    #[error("no image is displayed")]
    NothingDisplayed,
}

/// Errors raised while binding the widget to the page.
#[derive(Error, Debug)]
pub enum MountError {
    /// `window` or `document` is unavailable
    #[error("No {0} object available")]
    NoGlobal(&'static str),

    /// A required element is missing or has the wrong type
    #[error("Missing element: {selector}")]
    MissingElement {
        /// Id or selector that failed to resolve
        selector: String,
    },

    /// Widget configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A DOM call threw
    #[error("DOM error: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let not_image = SnapError::NotAnImage {
            mime_type: "text/plain".to_string(),
        };
        assert_eq!(not_image.category(), ErrorCategory::Validation);
        assert_eq!(
            SnapError::Transport("offline".to_string()).category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            SnapError::HttpStatus { status: 500 }.category(),
            ErrorCategory::Application
        );
        assert_eq!(SnapError::MissingFilename.category(), ErrorCategory::Application);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SnapError::HttpStatus { status: 404 }.to_string(),
            "HTTP error! status: 404"
        );
        assert_eq!(
            SnapError::Rejected {
                message: "File not found".to_string()
            }
            .to_string(),
            "File not found"
        );
        assert_eq!(
            SnapError::NotAnImage {
                mime_type: String::new()
            }
            .to_string(),
            crate::constants::messages::NOT_AN_IMAGE
        );
    }
}
