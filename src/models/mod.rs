//! Core data models for the fabrication job-file client.
//!
//! These types mirror the JSON the tracker backend emits and accepts.
//! They are plain `serde` values; nothing here performs I/O except
//! [`staged_file::StagedFile::from_path`], which reads a local file.

pub mod category;
pub mod project;
pub mod project_file;
pub mod record_id;
pub mod staged_file;
pub mod task;

pub use category::Category;
pub use project::{Project, ProjectDraft};
pub use project_file::{ProjectFile, is_previewable};
pub use record_id::RecordId;
pub use staged_file::StagedFile;
pub use task::{Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};
