//! Preview selection state machine.
//!
//! ```text
//!            select (not previewable)
//!   Idle ────────────────────────────▶ Unavailable
//!    │  select (previewable)
//!    ▼
//!  Loading ──blob ok──▶ Ready (owns the object URL)
//!    │
//!    └──blob err──▶ Failed
//! ```
//!
//! Any state moves to `Loading`/`Unavailable` on a new selection and to
//! `Idle` on [`PreviewSelector::clear`]. The live object URL is released as
//! part of leaving `Ready`, before anything else happens.

use crate::{
    errors::ApiResult,
    models::{ProjectFile, RecordId},
    services::{
        file_backend::Blob,
        object_urls::{ObjectUrlManager, ScopedObjectUrl},
    },
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum PreviewState {
    Idle,
    Loading { file: ProjectFile },
    Ready { file: ProjectFile, url: ScopedObjectUrl },
    /// Selected, but of a type that is offered for download only.
    Unavailable { file: ProjectFile },
    Failed { error: String },
}

/// Identifies one blob fetch started by [`PreviewSelector::select`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewTicket {
    pub file_id: RecordId,
    seq: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    /// The file is already shown; nothing was fetched or released.
    Unchanged,
    Unavailable,
    /// Fetch the blob and hand the result to [`PreviewSelector::resolve`].
    Fetch(PreviewTicket),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Ready,
    Failed,
    /// The ticket no longer matches the selection; the result was dropped.
    Stale,
}

pub struct PreviewSelector {
    urls: Arc<dyn ObjectUrlManager>,
    state: PreviewState,
    seq: u64,
}

impl PreviewSelector {
    pub fn new(urls: Arc<dyn ObjectUrlManager>) -> Self {
        Self {
            urls,
            state: PreviewState::Idle,
            seq: 0,
        }
    }

    pub fn select(&mut self, file: &ProjectFile) -> Selection {
        if let PreviewState::Ready { file: current, .. } = &self.state {
            if current.id == file.id {
                return Selection::Unchanged;
            }
        }

        // Leaving the old state drops its URL owner, which releases it.
        self.state = PreviewState::Idle;
        self.seq += 1;

        if !file.is_previewable() {
            debug!("{} ({}) is download-only", file.file_name, file.mime_type);
            self.state = PreviewState::Unavailable { file: file.clone() };
            return Selection::Unavailable;
        }

        self.state = PreviewState::Loading { file: file.clone() };
        Selection::Fetch(PreviewTicket {
            file_id: file.id.clone(),
            seq: self.seq,
        })
    }

    pub fn resolve(&mut self, ticket: &PreviewTicket, result: ApiResult<Blob>) -> Resolution {
        let current = match &self.state {
            PreviewState::Loading { file } if ticket.seq == self.seq && file.id == ticket.file_id => {
                file.clone()
            }
            _ => {
                debug!("discarding stale preview result for {}", ticket.file_id);
                return Resolution::Stale;
            }
        };

        match result {
            Ok(blob) => {
                let url = ScopedObjectUrl::acquire(&self.urls, blob);
                debug!("previewing {} at {}", current.file_name, url);
                self.state = PreviewState::Ready { file: current, url };
                Resolution::Ready
            }
            Err(err) => {
                warn!("preview of {} failed: {}", current.file_name, err);
                self.state = PreviewState::Failed {
                    error: format!("Failed to open {}: {}", current.file_name, err.cause_message()),
                };
                Resolution::Failed
            }
        }
    }

    /// Back to `Idle`, releasing any live URL and orphaning any fetch in flight.
    pub fn clear(&mut self) {
        self.state = PreviewState::Idle;
        self.seq += 1;
    }

    /// Clear the preview if it concerns `file_id`.
    pub fn forget(&mut self, file_id: &RecordId) {
        if self.selected().is_some_and(|f| &f.id == file_id) {
            self.clear();
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn selected(&self) -> Option<&ProjectFile> {
        match &self.state {
            PreviewState::Loading { file }
            | PreviewState::Ready { file, .. }
            | PreviewState::Unavailable { file } => Some(file),
            PreviewState::Idle | PreviewState::Failed { .. } => None,
        }
    }

    pub fn object_url(&self) -> Option<&str> {
        match &self.state {
            PreviewState::Ready { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn is_fetching_blob(&self) -> bool {
        matches!(self.state, PreviewState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PreviewState::Failed { error } => Some(error),
            _ => None,
        }
    }
}
