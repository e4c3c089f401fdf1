//! Upload dialog and submission bookkeeping.

use crate::{
    errors::ApiResult,
    models::Category,
    services::file_backend::UploadRequest,
    view::staging::StagingBuffer,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadBlocked {
    #[error("an upload is already in progress")]
    InProgress,
    #[error("no files staged")]
    NothingStaged,
    #[error("open a category before uploading")]
    NoCategory,
}

#[derive(Debug, PartialEq)]
pub enum UploadOutcome {
    /// Staging was cleared and the dialog closed; the list needs a refresh.
    Uploaded { response: Value },
    /// Staging is kept for a retry.
    Failed { error: String },
}

#[derive(Debug, Default)]
pub struct UploadOrchestrator {
    modal_open: bool,
    in_flight: bool,
}

impl UploadOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog with an empty staging area.
    pub fn open_modal(&mut self, staging: &mut StagingBuffer) {
        staging.clear();
        self.modal_open = true;
    }

    /// Close the dialog and discard staged files. Refused while submitting.
    pub fn close_modal(&mut self, staging: &mut StagingBuffer) -> bool {
        if self.in_flight {
            return false;
        }
        staging.clear();
        self.modal_open = false;
        true
    }

    /// Package every staged file into one request and mark the upload in
    /// flight. The staging buffer is left as is until the outcome is known.
    pub fn begin(
        &mut self,
        project_no: &str,
        category: Option<Category>,
        staging: &StagingBuffer,
    ) -> Result<UploadRequest, UploadBlocked> {
        if self.in_flight {
            return Err(UploadBlocked::InProgress);
        }
        let category = category.ok_or(UploadBlocked::NoCategory)?;
        if staging.is_empty() {
            return Err(UploadBlocked::NothingStaged);
        }
        self.in_flight = true;
        Ok(UploadRequest {
            project_no: project_no.to_string(),
            category,
            files: staging.files().to_vec(),
        })
    }

    pub fn finish(&mut self, result: ApiResult<Value>, staging: &mut StagingBuffer) -> UploadOutcome {
        self.in_flight = false;
        match result {
            Ok(response) => {
                info!("upload of {} file(s) accepted", staging.len());
                staging.clear();
                self.modal_open = false;
                UploadOutcome::Uploaded { response }
            }
            Err(err) => {
                warn!("upload failed: {}", err);
                UploadOutcome::Failed {
                    error: format!("File upload failed: {}", err.cause_message()),
                }
            }
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight
    }
}
