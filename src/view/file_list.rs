//! Files already stored for the open project/category pair.
//!
//! Fetches are issued by the owning view; this type only decides which
//! answers still apply. Every fetch gets a ticket and only the newest
//! ticket's answer is applied, so a slow response for a category the user
//! already left cannot overwrite the current list.

use crate::{
    errors::ApiResult,
    models::{Category, ProjectFile, RecordId},
};

/// Identifies one list fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListTicket {
    pub project_no: String,
    pub category: Category,
    seq: u64,
}

#[derive(Debug)]
pub struct CategoryFileList {
    project_no: String,
    category: Option<Category>,
    files: Vec<ProjectFile>,
    error: Option<String>,
    loading: bool,
    seq: u64,
}

impl CategoryFileList {
    pub fn new(project_no: impl Into<String>) -> Self {
        Self {
            project_no: project_no.into(),
            category: None,
            files: Vec::new(),
            error: None,
            loading: false,
            seq: 0,
        }
    }

    /// Switch to `category` and start a fetch for it. A different pair
    /// starts from an empty list; reopening the same one keeps what is held.
    pub fn open(&mut self, category: Category) -> ListTicket {
        if self.category != Some(category) {
            self.files.clear();
        }
        self.category = Some(category);
        self.begin(category)
    }

    /// Start a fetch for the open pair, if any.
    pub fn refresh(&mut self) -> Option<ListTicket> {
        let category = self.category?;
        Some(self.begin(category))
    }

    /// Leave the category; any fetch still in flight is ignored on arrival.
    pub fn close(&mut self) {
        self.category = None;
        self.files.clear();
        self.error = None;
        self.loading = false;
        self.seq += 1;
    }

    fn begin(&mut self, category: Category) -> ListTicket {
        self.seq += 1;
        self.loading = true;
        self.error = None;
        ListTicket {
            project_no: self.project_no.clone(),
            category,
            seq: self.seq,
        }
    }

    /// Apply a fetch result. Success replaces the list wholesale; failure
    /// keeps the previous list and records an error. Returns `false` when
    /// the ticket is stale and nothing changed.
    pub fn apply(&mut self, ticket: &ListTicket, result: ApiResult<Vec<ProjectFile>>) -> bool {
        if ticket.seq != self.seq || self.category != Some(ticket.category) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(files) => {
                self.files = files;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(
                    "listing {} files for {} failed: {}",
                    ticket.category,
                    ticket.project_no,
                    err
                );
                self.error = Some(format!(
                    "Failed to load {} files for project {}.",
                    ticket.category, ticket.project_no
                ));
            }
        }
        true
    }

    /// Drop one entry after the backend confirmed its deletion.
    pub fn remove(&mut self, id: &RecordId) -> Option<ProjectFile> {
        let index = self.files.iter().position(|f| &f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn find(&self, id: &RecordId) -> Option<&ProjectFile> {
        self.files.iter().find(|f| &f.id == id)
    }

    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn project_no(&self) -> &str {
        &self.project_no
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
