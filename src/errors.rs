use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Failures of calls against the tracker backend.
///
/// Transport failures, non-2xx answers and undecodable bodies stay distinct
/// so callers can log them precisely, even though the views show all of them
/// to the user as one generic failure line.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (server unreachable, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("API Request Failed ({status}): {message}")]
    Server { status: u16, message: String },

    /// A response that should carry JSON could not be decoded.
    #[error("malformed response: {0}")]
    Parse(String),

    /// Any failure while submitting a multipart upload.
    #[error("upload failed: {0}")]
    Upload(#[source] Box<ApiError>),

    /// Any failure while retrieving file bytes for preview or download.
    #[error("could not fetch file content: {0}")]
    BlobFetch(#[source] Box<ApiError>),

    /// The configured API base is not a usable URL.
    #[error("invalid API base `{0}`")]
    InvalidBase(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn into_upload(self) -> Self {
        match self {
            ApiError::Upload(_) => self,
            other => ApiError::Upload(Box::new(other)),
        }
    }

    pub fn into_blob_fetch(self) -> Self {
        match self {
            ApiError::BlobFetch(_) => self,
            other => ApiError::BlobFetch(Box::new(other)),
        }
    }

    /// Message of the underlying failure, without the operation wrapper.
    pub fn cause_message(&self) -> String {
        match self {
            ApiError::Upload(inner) | ApiError::BlobFetch(inner) => inner.cause_message(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the underlying server failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Upload(inner) | ApiError::BlobFetch(inner) => inner.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

/// Error returned by the local preview server's handlers.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}
