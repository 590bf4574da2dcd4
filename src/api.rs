//! HTTP surface of the storage service.
//!
//! URLs, request options and the interpretation of responses live here as
//! plain functions over status codes and body text. The browser binding only
//! moves bytes; every decision about what a response means is made here.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, messages};
use crate::error::SnapError;

/// Characters escaped in a single path segment: the URL path set plus `/`
/// and `%`, so a stored name can never split into more segments.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

fn encode_segment(filename: &str) -> String {
    utf8_percent_encode(filename, PATH_SEGMENT).to_string()
}

/// Where the storage service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Prefix for every path, empty for same-origin
    base_url: String,
    /// Path under which stored files are served, with both slashes
    uploads_path: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, uploads_path: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mut uploads_path = uploads_path.into();
        if !uploads_path.starts_with('/') {
            uploads_path.insert(0, '/');
        }
        if !uploads_path.ends_with('/') {
            uploads_path.push('/');
        }
        Self {
            base_url,
            uploads_path,
        }
    }

    /// Same-origin endpoints with the default uploads path.
    pub fn same_origin() -> Self {
        Self::new("", endpoints::DEFAULT_UPLOADS_PATH)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::UPLOAD_PATH)
    }

    pub fn delete_url(&self, filename: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            endpoints::DELETE_PATH,
            encode_segment(filename)
        )
    }

    /// Display source of a stored file.
    pub fn image_url(&self, filename: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            self.uploads_path,
            encode_segment(filename)
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::same_origin()
    }
}

/// Options for cross-origin deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossOrigin {
    /// Value sent in the `Origin` header
    pub origin: String,
    /// Send cookies with the requests
    #[serde(default = "default_include_credentials")]
    pub include_credentials: bool,
}

fn default_include_credentials() -> bool {
    true
}

/// Headers and credential mode applied to both requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestOptions {
    pub headers: Vec<(&'static str, String)>,
    pub include_credentials: bool,
}

impl RequestOptions {
    pub fn for_deployment(cross_origin: Option<&CrossOrigin>) -> Self {
        match cross_origin {
            None => Self::default(),
            Some(cors) => Self {
                headers: vec![
                    ("Accept", "application/json".to_string()),
                    ("Origin", cors.origin.clone()),
                ],
                include_credentials: cors.include_credentials,
            },
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// JSON body of `POST /upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Optional JSON body of `DELETE /delete/{filename}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// A file the server has stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub filename: String,
    /// Display source derived from the filename
    pub url: String,
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Error for a non-2xx response, preferring the server's own message.
fn failed_status(status: u16, body: &str) -> SnapError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(message),
        }) if !message.is_empty() => SnapError::Rejected { message },
        _ => SnapError::HttpStatus { status },
    }
}

/// Turn an upload response into the stored image or the reason it failed.
pub fn interpret_upload(
    endpoints: &Endpoints,
    status: u16,
    body: &str,
) -> Result<UploadedImage, SnapError> {
    if !is_success_status(status) {
        return Err(failed_status(status, body));
    }

    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| SnapError::MalformedResponse(e.to_string()))?;

    if !response.success {
        return Err(SnapError::Rejected {
            message: response
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| messages::UPLOAD_FAILED.to_string()),
        });
    }

    let filename = response
        .filename
        .filter(|name| !name.is_empty())
        .ok_or(SnapError::MissingFilename)?;

    Ok(UploadedImage {
        url: endpoints.image_url(&filename),
        filename,
    })
}

/// Turn a delete response into success or the reason it failed.
///
/// A 2xx response counts as success unless its body is JSON that says
/// otherwise.
pub fn interpret_delete(status: u16, body: &str) -> Result<(), SnapError> {
    if !is_success_status(status) {
        return Err(failed_status(status, body));
    }

    if body.trim().is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<DeleteResponse>(body) {
        Ok(response) if !response.success => Err(SnapError::Rejected {
            message: response
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| messages::DELETE_FAILED.to_string()),
        }),
        Ok(_) => Ok(()),
        Err(e) => {
            log::debug!("Delete response body is not JSON ({}), accepting status {}", e, status);
            Ok(())
        }
    }
}
