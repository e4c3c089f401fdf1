//! One task board for every fabrication stage.
//!
//! The board is parameterised by its [`TaskSource`] (which knows the
//! stage's endpoint) and takes its labels from the source's category.

use crate::{
    errors::ApiResult,
    models::{Category, RecordId, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus},
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::warn;

#[async_trait]
pub trait TaskSource: Send + Sync {
    fn category(&self) -> Category;
    async fn list(&self) -> ApiResult<Vec<Task>>;
    async fn create(&self, draft: &TaskDraft) -> ApiResult<Task>;
    async fn update(&self, id: &RecordId, patch: &TaskPatch) -> ApiResult<Task>;
    async fn delete(&self, id: &RecordId) -> ApiResult<()>;
}

/// Narrowing of the visible tasks; `None` in a field means "all".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub project_no: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.priority.is_none_or(|p| task.priority == p)
            && self.status.is_none_or(|s| task.status == s)
            && self
                .project_no
                .as_deref()
                .is_none_or(|p| task.project_no.as_deref() == Some(p))
    }
}

/// Proof that the user was asked before a task is deleted.
#[derive(Debug)]
pub struct TaskDeletion {
    id: RecordId,
}

pub struct TaskBoard<S> {
    source: S,
    tasks: Vec<Task>,
    filter: TaskFilter,
    error: Option<String>,
    loading: bool,
}

impl<S: TaskSource> TaskBoard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            error: None,
            loading: false,
        }
    }

    pub fn title(&self) -> String {
        format!("{} Tasks", self.source.category().label())
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        match self.source.list().await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => {
                warn!("loading {} tasks failed: {}", self.source.category(), err);
                self.error = Some("Failed to load tasks. Please ensure the backend is running.".into());
            }
        }
        self.loading = false;
    }

    pub async fn create(&mut self, draft: &TaskDraft) -> bool {
        match self.source.create(draft).await {
            Ok(task) => {
                self.tasks.push(task);
                true
            }
            Err(err) => {
                warn!("creating task failed: {}", err);
                self.error = Some("Failed to create task. Check console for details.".into());
                false
            }
        }
    }

    pub async fn update(&mut self, id: &RecordId, patch: &TaskPatch) -> bool {
        match self.source.update(id, patch).await {
            Ok(task) => {
                self.replace(task);
                true
            }
            Err(err) => {
                warn!("updating task {} failed: {}", id, err);
                self.error = Some("Failed to save changes to the task.".into());
                false
            }
        }
    }

    pub async fn set_status(&mut self, id: &RecordId, status: TaskStatus) -> bool {
        match self.source.update(id, &TaskPatch::status(status)).await {
            Ok(task) => {
                self.replace(task);
                true
            }
            Err(err) => {
                warn!("updating status of task {} failed: {}", id, err);
                self.error = Some("Failed to update task status.".into());
                false
            }
        }
    }

    pub fn request_delete(&self, id: &RecordId) -> Option<TaskDeletion> {
        self.tasks
            .iter()
            .any(|t| &t.id == id)
            .then(|| TaskDeletion { id: id.clone() })
    }

    pub async fn confirm_delete(&mut self, deletion: TaskDeletion) -> bool {
        match self.source.delete(&deletion.id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != deletion.id);
                true
            }
            Err(err) => {
                warn!("deleting task {} failed: {}", deletion.id, err);
                self.error = Some("Failed to delete task.".into());
                false
            }
        }
    }

    fn replace(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn visible(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t))
    }

    /// Sorted, de-duplicated project numbers for the filter choices.
    pub fn project_numbers(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter_map(|t| t.project_no.as_deref())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
