//! Files chosen for upload, in selection order, unique by name.

use crate::models::StagedFile;
use std::collections::HashSet;

/// Size the upload dialog advertises per file. Not enforced locally;
/// the backend decides what it accepts.
pub const ADVISORY_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Default, Clone)]
pub struct StagingBuffer {
    files: Vec<StagedFile>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files whose name is not staged yet, keeping their order.
    /// A later file with an already-seen name (from this batch or an
    /// earlier one) is dropped silently. Returns how many were added.
    pub fn add(&mut self, incoming: impl IntoIterator<Item = StagedFile>) -> usize {
        let mut seen: HashSet<String> = self.files.iter().map(|f| f.name.clone()).collect();
        let before = self.files.len();
        for file in incoming {
            if seen.insert(file.name.clone()) {
                self.files.push(file);
            }
        }
        self.files.len() - before
    }

    /// Remove the entry at `index`; out-of-range indices change nothing.
    pub fn remove_at(&mut self, index: usize) -> Option<StagedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Staged files larger than the advertised guideline.
    pub fn oversized(&self) -> impl Iterator<Item = &StagedFile> {
        self.files
            .iter()
            .filter(|f| f.size > ADVISORY_MAX_FILE_BYTES)
    }
}
