//! Client-side view state: the per-project file browser and its parts,
//! the stage task board, and hash-route matching.

pub mod download;
pub mod file_list;
pub mod file_view;
pub mod navigation;
pub mod preview;
pub mod staging;
pub mod task_board;
pub mod upload;

pub use file_view::{DeleteConfirmation, FileView, ViewEvent, ViewUpdate};
pub use navigation::Route;
pub use preview::{PreviewSelector, PreviewState, Selection};
pub use staging::StagingBuffer;
pub use task_board::{TaskBoard, TaskDeletion, TaskFilter, TaskSource};
