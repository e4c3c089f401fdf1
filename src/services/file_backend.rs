//! The file operations the file view depends on.
//!
//! [`ApiClient`](super::api_client::ApiClient) is the production
//! implementation; the view only ever sees this trait, so tests can drive it
//! with an in-memory backend.

use crate::{
    errors::ApiResult,
    models::{Category, ProjectFile, RecordId, StagedFile},
};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Raw file content as served by the blob endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One multipart upload: every staged file for a project/category pair.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub project_no: String,
    pub category: Category,
    pub files: Vec<StagedFile>,
}

impl UploadRequest {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

#[async_trait]
pub trait FileBackend: Send + Sync {
    /// Files stored for one project and category.
    async fn list_files(&self, project_no: &str, category: Category) -> ApiResult<Vec<ProjectFile>>;

    /// Content of one file. Errors are reported as `ApiError::BlobFetch`.
    async fn fetch_blob(&self, file_id: &RecordId) -> ApiResult<Blob>;

    /// Submit all files of `request` in a single multipart call.
    /// Errors are reported as `ApiError::Upload`.
    async fn upload(&self, request: &UploadRequest) -> ApiResult<Value>;

    async fn delete_file(&self, file_id: &RecordId) -> ApiResult<()>;
}
