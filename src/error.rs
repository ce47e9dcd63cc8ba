//! Error types for the yadisk crate.

use serde::Deserialize;
use thiserror::Error;

/// Structured error payload returned by the API for any status >= 400.
///
/// The status code is not part of the JSON body; the response decoder attaches
/// it after decoding.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[error("{error_id}: {description}")]
#[serde(default)]
pub struct ApiError {
    /// HTTP status of the response that carried this error.
    #[serde(skip)]
    pub status_code: u16,

    /// Human readable message.
    pub message: String,

    /// Detailed description for the developer.
    pub description: String,

    /// Error identifier for programmatic handling, e.g. `DiskNotFoundError`.
    #[serde(rename = "error")]
    pub error_id: String,
}

/// Errors that can occur when talking to Yandex.Disk.
#[derive(Error, Debug)]
pub enum DiskError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to resolve request URL: {0}")]
    UrlResolution(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    RequestConstruction(String),

    #[error("API error ({status}): {0}", status = .0.status_code)]
    Api(#[from] ApiError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFile(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParse(#[source] serde_json::Error),
}

impl DiskError {
    /// Returns the API error payload if this is a decoded API failure.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            DiskError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for DiskError.
pub type Result<T> = std::result::Result<T, DiskError>;
