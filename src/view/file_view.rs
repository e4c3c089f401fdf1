//! src/view/file_view.rs
//!
//! FileView: the file browser for one project. It composes the category
//! list, preview selector, staging buffer and upload dialog, starts every
//! network call as a spawned task and applies the answers when they come
//! back through its event channel.
//!
//! All state lives in this one value and only `&mut self` methods touch it,
//! so answers are applied one at a time in the owner's task. When the view
//! is dropped its receiver goes with it: answers still in flight are
//! discarded on send and the live preview URL is released by its owner.

use crate::{
    errors::ApiResult,
    models::{Category, ProjectFile, RecordId, StagedFile},
    services::{
        file_backend::{Blob, FileBackend},
        object_urls::ObjectUrlManager,
    },
    view::{
        download::{safe_file_name, save_bytes},
        file_list::{CategoryFileList, ListTicket},
        preview::{PreviewSelector, PreviewTicket, Resolution, Selection},
        staging::StagingBuffer,
        upload::{UploadBlocked, UploadOrchestrator, UploadOutcome},
    },
};
use serde_json::Value;
use std::{
    collections::HashSet,
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Completion of a call started by the view.
#[derive(Debug)]
pub enum ViewEvent {
    FilesLoaded {
        ticket: ListTicket,
        result: ApiResult<Vec<ProjectFile>>,
    },
    BlobLoaded {
        ticket: PreviewTicket,
        result: ApiResult<Blob>,
    },
    Uploaded {
        project_no: String,
        category: Category,
        result: ApiResult<Value>,
    },
    Deleted {
        file: ProjectFile,
        result: ApiResult<()>,
    },
    Downloaded {
        file: ProjectFile,
        result: Result<PathBuf, String>,
    },
}

/// What an applied event changed, for the caller to re-render.
#[derive(Debug, PartialEq)]
pub enum ViewUpdate {
    Files,
    Preview,
    UploadFinished { ok: bool },
    DeleteFinished { ok: bool },
    DownloadFinished { path: Option<PathBuf> },
    /// The answer belonged to a request that no longer matters.
    Stale,
}

/// Proof that the user was asked before a file is deleted.
/// Only [`FileView::request_delete`] creates one.
#[derive(Debug)]
pub struct DeleteConfirmation {
    file: ProjectFile,
}

impl DeleteConfirmation {
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to permanently delete: {}?",
            self.file.file_name
        )
    }

    pub fn file(&self) -> &ProjectFile {
        &self.file
    }
}

pub struct FileView {
    backend: Arc<dyn FileBackend>,
    list: CategoryFileList,
    preview: PreviewSelector,
    staging: StagingBuffer,
    upload: UploadOrchestrator,
    deleting: HashSet<RecordId>,
    downloading: HashSet<RecordId>,
    error: Option<String>,
    in_flight: usize,
    tx: mpsc::UnboundedSender<ViewEvent>,
    rx: mpsc::UnboundedReceiver<ViewEvent>,
}

impl FileView {
    pub fn new(
        project_no: impl Into<String>,
        backend: Arc<dyn FileBackend>,
        urls: Arc<dyn ObjectUrlManager>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            list: CategoryFileList::new(project_no),
            preview: PreviewSelector::new(urls),
            staging: StagingBuffer::new(),
            upload: UploadOrchestrator::new(),
            deleting: HashSet::new(),
            downloading: HashSet::new(),
            error: None,
            in_flight: 0,
            tx,
            rx,
        }
    }

    // --- Navigation ---

    /// Show the files of `category`, releasing any preview of the previous one.
    pub fn open_category(&mut self, category: Category) {
        info!("opening {} files for {}", category, self.list.project_no());
        self.preview.clear();
        self.error = None;
        let ticket = self.list.open(category);
        self.fetch_list(ticket);
    }

    /// Return to the category cards.
    pub fn back_to_categories(&mut self) {
        self.preview.clear();
        self.upload.close_modal(&mut self.staging);
        self.list.close();
        self.error = None;
    }

    /// Fetch the open category again. Returns `false` when none is open
    /// or a fetch is already running.
    pub fn reload(&mut self) -> bool {
        if self.list.is_loading() {
            return false;
        }
        self.refetch()
    }

    /// Start a fetch of the open category even if one is running; the newer
    /// ticket wins. Used after writes so the list reflects them.
    fn refetch(&mut self) -> bool {
        match self.list.refresh() {
            Some(ticket) => {
                self.error = None;
                self.fetch_list(ticket);
                true
            }
            None => false,
        }
    }

    fn fetch_list(&mut self, ticket: ListTicket) {
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.list_files(&ticket.project_no, ticket.category).await;
            ViewEvent::FilesLoaded { ticket, result }
        });
    }

    // --- Preview ---

    /// Select a listed file for preview. Returns `None` when the id is not
    /// in the current list.
    pub fn select_file(&mut self, file_id: &RecordId) -> Option<Selection> {
        let file = self.list.find(file_id)?.clone();
        let selection = self.preview.select(&file);
        if selection != Selection::Unchanged {
            self.error = None;
        }
        if let Selection::Fetch(ticket) = &selection {
            let ticket = ticket.clone();
            let backend = Arc::clone(&self.backend);
            self.spawn(async move {
                let result = backend.fetch_blob(&ticket.file_id).await;
                ViewEvent::BlobLoaded { ticket, result }
            });
        }
        Some(selection)
    }

    // --- Upload dialog ---

    pub fn open_upload_modal(&mut self) {
        self.upload.open_modal(&mut self.staging);
    }

    /// Close the dialog, discarding staged files. Refused mid-upload.
    pub fn close_upload_modal(&mut self) -> bool {
        self.upload.close_modal(&mut self.staging)
    }

    /// Files chosen through the picker. Ignored while an upload runs.
    pub fn stage_from_picker(&mut self, files: Vec<StagedFile>) -> usize {
        self.stage(files)
    }

    /// Files dropped onto the dialog. Ignored while an upload runs.
    pub fn stage_from_drop(&mut self, files: Vec<StagedFile>) -> usize {
        self.stage(files)
    }

    fn stage(&mut self, files: Vec<StagedFile>) -> usize {
        if self.upload.is_uploading() {
            return 0;
        }
        self.staging.add(files)
    }

    pub fn unstage(&mut self, index: usize) -> Option<StagedFile> {
        if self.upload.is_uploading() {
            return None;
        }
        self.staging.remove_at(index)
    }

    /// Submit every staged file for the open category in one request.
    pub fn start_upload(&mut self) -> Result<(), UploadBlocked> {
        let request = self
            .upload
            .begin(self.list.project_no(), self.list.category(), &self.staging)?;
        self.error = None;
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.upload(&request).await;
            ViewEvent::Uploaded {
                project_no: request.project_no,
                category: request.category,
                result,
            }
        });
        Ok(())
    }

    // --- Delete ---

    /// First step of a delete: returns the confirmation to show the user.
    /// `None` when the file is unknown or already being deleted.
    pub fn request_delete(&self, file_id: &RecordId) -> Option<DeleteConfirmation> {
        if self.deleting.contains(file_id) {
            return None;
        }
        let file = self.list.find(file_id)?.clone();
        Some(DeleteConfirmation { file })
    }

    /// Second step of a delete, after the user agreed.
    pub fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> bool {
        let file = confirmation.file;
        if !self.deleting.insert(file.id.clone()) {
            return false;
        }
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.delete_file(&file.id).await;
            ViewEvent::Deleted { file, result }
        });
        true
    }

    // --- Download ---

    /// Fetch a listed file and save it under `dir`. Returns `false` when the
    /// file is unknown or a download of it is already running.
    pub fn download(&mut self, file_id: &RecordId, dir: &Path) -> bool {
        let Some(file) = self.list.find(file_id).cloned() else {
            return false;
        };
        if !self.downloading.insert(file.id.clone()) {
            return false;
        }
        let backend = Arc::clone(&self.backend);
        let dir = dir.to_path_buf();
        self.spawn(async move {
            let result = match backend.fetch_blob(&file.id).await {
                Ok(blob) => {
                    let name = safe_file_name(&file.file_name, &format!("file-{}", file.id));
                    save_bytes(&dir, &name, &blob.bytes)
                        .await
                        .map_err(|err| err.to_string())
                }
                Err(err) => Err(err.cause_message()),
            };
            ViewEvent::Downloaded { file, result }
        });
        true
    }

    // --- Event loop ---

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = ViewEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // A closed channel means the view is gone; the answer is dropped.
            let _ = tx.send(call.await);
        });
    }

    /// Number of started calls whose answers have not been applied yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next answer and apply it. Returns `None` when nothing is
    /// in flight.
    pub async fn next_update(&mut self) -> Option<ViewUpdate> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.rx.recv().await?;
        Some(self.apply(event))
    }

    /// Apply answers until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    /// Apply one completed call to the view state.
    pub fn apply(&mut self, event: ViewEvent) -> ViewUpdate {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            ViewEvent::FilesLoaded { ticket, result } => {
                if !self.list.apply(&ticket, result) {
                    return ViewUpdate::Stale;
                }
                if let Some(err) = self.list.error() {
                    self.error = Some(err.to_string());
                }
                ViewUpdate::Files
            }
            ViewEvent::BlobLoaded { ticket, result } => match self.preview.resolve(&ticket, result) {
                Resolution::Stale => ViewUpdate::Stale,
                Resolution::Ready => ViewUpdate::Preview,
                Resolution::Failed => {
                    self.error = self.preview.error().map(str::to_string);
                    ViewUpdate::Preview
                }
            },
            ViewEvent::Uploaded {
                project_no,
                category,
                result,
            } => match self.upload.finish(result, &mut self.staging) {
                UploadOutcome::Uploaded { response } => {
                    debug!("upload response: {}", response);
                    if self.list.project_no() == project_no && self.list.category() == Some(category) {
                        self.refetch();
                    }
                    ViewUpdate::UploadFinished { ok: true }
                }
                UploadOutcome::Failed { error } => {
                    self.error = Some(error);
                    ViewUpdate::UploadFinished { ok: false }
                }
            },
            ViewEvent::Deleted { file, result } => {
                self.deleting.remove(&file.id);
                match result {
                    Ok(()) => {
                        info!("deleted {} ({})", file.file_name, file.id);
                        self.preview.forget(&file.id);
                        self.list.remove(&file.id);
                        if file.category.is_none_or(|c| self.list.category() == Some(c)) {
                            self.refetch();
                        }
                        ViewUpdate::DeleteFinished { ok: true }
                    }
                    Err(err) => {
                        warn!("delete of {} failed: {}", file.file_name, err);
                        self.error = Some(format!("Failed to delete {}.", file.file_name));
                        ViewUpdate::DeleteFinished { ok: false }
                    }
                }
            }
            ViewEvent::Downloaded { file, result } => {
                self.downloading.remove(&file.id);
                match result {
                    Ok(path) => {
                        info!("saved {} to {}", file.file_name, path.display());
                        ViewUpdate::DownloadFinished { path: Some(path) }
                    }
                    Err(err) => {
                        warn!("download of {} failed: {}", file.file_name, err);
                        self.error = Some(format!("Failed to download {}: {}", file.file_name, err));
                        ViewUpdate::DownloadFinished { path: None }
                    }
                }
            }
        }
    }

    // --- Read access ---

    pub fn project_no(&self) -> &str {
        self.list.project_no()
    }

    pub fn category(&self) -> Option<Category> {
        self.list.category()
    }

    pub fn files(&self) -> &[ProjectFile] {
        self.list.files()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn preview(&self) -> &PreviewSelector {
        &self.preview
    }

    pub fn staging(&self) -> &StagingBuffer {
        &self.staging
    }

    pub fn is_upload_modal_open(&self) -> bool {
        self.upload.is_modal_open()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload.is_uploading()
    }

    pub fn is_deleting(&self, file_id: &RecordId) -> bool {
        self.deleting.contains(file_id)
    }

    /// The latest failure, as shown next to the affected control.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The list is loaded, empty and not in error: show the upload prompt.
    pub fn shows_empty_state(&self) -> bool {
        self.category().is_some()
            && !self.is_loading()
            && self.list.error().is_none()
            && self.files().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingUrls, FakeBackend, file};
    use std::sync::atomic::Ordering;

    fn door_files() -> Vec<ProjectFile> {
        vec![
            file("1", "front.png", "image/png", Category::Door),
            file("2", "spec.pdf", "application/pdf", Category::Door),
            file("3", "quote.docx", "application/msword", Category::Door),
        ]
    }

    fn view_with(backend: Arc<FakeBackend>) -> (FileView, Arc<CountingUrls>) {
        let urls = Arc::new(CountingUrls::default());
        (FileView::new("17408", backend, urls.clone()), urls)
    }

    fn id(value: &str) -> RecordId {
        RecordId::from(value)
    }

    #[tokio::test]
    async fn empty_category_shows_empty_state() {
        let backend = Arc::new(FakeBackend::default());
        let (mut view, _urls) = view_with(backend.clone());

        view.open_category(Category::Door);
        assert!(view.is_loading());
        view.settle().await;

        assert!(view.shows_empty_state());
        assert_eq!(view.error(), None);
        assert_eq!(view.select_file(&id("anything")), None);
        assert_eq!(backend.blob_call_count(), 0);
    }

    #[tokio::test]
    async fn list_failure_surfaces_error_and_keeps_list() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        backend.fail_lists.store(true, Ordering::SeqCst);
        assert!(view.reload());
        view.settle().await;

        assert_eq!(view.files().len(), 3);
        assert_eq!(view.error(), Some("Failed to load door files for project 17408."));
    }

    #[tokio::test]
    async fn selecting_previews_and_reclick_does_not_refetch() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        assert!(matches!(view.select_file(&id("1")), Some(Selection::Fetch(_))));
        assert!(view.preview().is_fetching_blob());
        assert_eq!(view.settle().await, vec![ViewUpdate::Preview]);
        assert!(view.preview().object_url().is_some());

        assert_eq!(view.select_file(&id("1")), Some(Selection::Unchanged));
        assert_eq!(view.pending(), 0);
        assert_eq!(backend.blob_call_count(), 1);
        assert_eq!(urls.created(), 1);
    }

    #[tokio::test]
    async fn late_blob_for_a_is_discarded_after_selecting_b() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        backend.gate("1");
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        view.select_file(&id("1"));
        view.select_file(&id("2"));
        let first = view.next_update().await;
        assert_eq!(first, Some(ViewUpdate::Preview));
        assert_eq!(view.preview().selected().map(|f| f.id.as_str()), Some("2"));

        backend.open_gate("1");
        assert_eq!(view.next_update().await, Some(ViewUpdate::Stale));
        assert_eq!(view.preview().selected().map(|f| f.id.as_str()), Some("2"));
        assert_eq!(urls.created(), 1);
    }

    #[tokio::test]
    async fn failed_blob_then_other_selection_recovers() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        backend.fail_blob("1");
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        view.select_file(&id("1"));
        view.settle().await;
        assert!(view.preview().selected().is_none());
        assert!(!view.preview().is_fetching_blob());
        assert_eq!(
            view.error(),
            Some("Failed to open front.png: network error: connection reset")
        );

        view.select_file(&id("2"));
        assert_eq!(view.error(), None);
        view.settle().await;
        assert!(view.preview().object_url().is_some());
    }

    #[tokio::test]
    async fn non_previewable_selection_offers_download_only() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        assert_eq!(view.select_file(&id("3")), Some(Selection::Unavailable));
        assert_eq!(view.pending(), 0);
        assert_eq!(urls.created(), 0);
    }

    #[tokio::test]
    async fn a_then_b_then_drop_releases_every_url() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        view.select_file(&id("1"));
        view.settle().await;
        view.select_file(&id("2"));
        view.settle().await;
        assert_eq!(urls.live(), 1);
        drop(view);

        assert_eq!(urls.created(), 2);
        assert_eq!(urls.released().len(), 2);
        assert_eq!(urls.max_live(), 1);
    }

    #[tokio::test]
    async fn switching_category_releases_the_preview() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;
        view.select_file(&id("1"));
        view.settle().await;

        view.open_category(Category::System);
        assert_eq!(urls.live(), 0);
        view.settle().await;
        assert!(view.files().is_empty());

        view.select_file(&id("1"));
        assert_eq!(backend.blob_call_count(), 1);
    }

    #[tokio::test]
    async fn successful_upload_clears_staging_and_refreshes_once() {
        let backend = Arc::new(FakeBackend::default());
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        view.open_upload_modal();
        view.stage_from_picker(vec![StagedFile::new("a.pdf", vec![1], "application/pdf")]);
        view.stage_from_drop(vec![
            StagedFile::new("a.pdf", vec![2], "application/pdf"),
            StagedFile::new("b.png", vec![3], "image/png"),
        ]);
        assert_eq!(view.staging().len(), 2);

        let lists_before = backend.list_calls_for("17408", Category::Door);
        view.start_upload().unwrap();
        assert!(view.is_uploading());
        assert_eq!(view.start_upload(), Err(UploadBlocked::InProgress));

        let updates = view.settle().await;
        assert_eq!(updates, vec![ViewUpdate::UploadFinished { ok: true }, ViewUpdate::Files]);
        assert!(view.staging().is_empty());
        assert!(!view.is_upload_modal_open());
        assert_eq!(backend.list_calls_for("17408", Category::Door), lists_before + 1);
        assert_eq!(backend.upload_count.load(Ordering::SeqCst), 1);

        let uploaded = &backend.uploads.lock().unwrap()[0];
        let names: Vec<_> = uploaded.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
        assert_eq!(view.files().len(), 2);
    }

    #[tokio::test]
    async fn failed_upload_keeps_staging_for_retry() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_uploads.store(true, Ordering::SeqCst);
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Panel);
        view.settle().await;

        view.open_upload_modal();
        view.stage_from_picker(vec![StagedFile::new("slab.dwg", vec![1], "image/vnd.dwg")]);
        let lists_before = backend.list_calls_for("17408", Category::Panel);
        view.start_upload().unwrap();
        assert_eq!(view.settle().await, vec![ViewUpdate::UploadFinished { ok: false }]);

        assert_eq!(view.staging().len(), 1);
        assert!(view.is_upload_modal_open());
        assert_eq!(
            view.error(),
            Some("File upload failed: API Request Failed (413): File too large")
        );
        assert_eq!(backend.list_calls_for("17408", Category::Panel), lists_before);
    }

    #[tokio::test]
    async fn staging_is_frozen_while_an_upload_runs() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        view.open_upload_modal();
        view.stage_from_picker(vec![StagedFile::new("a.pdf", vec![1], "application/pdf")]);
        view.start_upload().unwrap();

        let late = StagedFile::new("late.pdf", vec![2], "application/pdf");
        assert_eq!(view.stage_from_drop(vec![late.clone()]), 0);
        assert_eq!(view.stage_from_picker(vec![late]), 0);
        assert!(view.unstage(0).is_none());
        assert_eq!(view.staging().len(), 1);

        view.settle().await;
        let uploaded = &backend.uploads.lock().unwrap()[0];
        let names: Vec<_> = uploaded.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf"]);
        assert!(view.staging().is_empty());

        view.open_upload_modal();
        assert_eq!(
            view.stage_from_drop(vec![StagedFile::new("late.pdf", vec![2], "application/pdf")]),
            1
        );
    }

    #[tokio::test]
    async fn reload_is_refused_while_a_fetch_runs() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        assert!(!view.reload());
        view.settle().await;
        assert_eq!(backend.list_calls_for("17408", Category::Door), 1);

        assert!(view.reload());
        view.settle().await;
        assert_eq!(backend.list_calls_for("17408", Category::Door), 2);
    }

    #[tokio::test]
    async fn upload_without_category_is_refused() {
        let backend = Arc::new(FakeBackend::default());
        let (mut view, _urls) = view_with(backend);
        view.stage_from_picker(vec![StagedFile::new("a", vec![1], "text/plain")]);
        assert_eq!(view.start_upload(), Err(UploadBlocked::NoCategory));
    }

    #[tokio::test]
    async fn delete_requires_confirmation_and_releases_preview() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;
        view.select_file(&id("2"));
        view.settle().await;

        let confirmation = view.request_delete(&id("2")).unwrap();
        assert_eq!(
            confirmation.prompt(),
            "Are you sure you want to permanently delete: spec.pdf?"
        );
        assert!(backend.deletes.lock().unwrap().is_empty());

        assert!(view.confirm_delete(confirmation));
        assert!(view.is_deleting(&id("2")));
        assert!(view.request_delete(&id("2")).is_none());

        let updates = view.settle().await;
        assert_eq!(updates, vec![ViewUpdate::DeleteFinished { ok: true }, ViewUpdate::Files]);
        assert_eq!(urls.live(), 0);
        assert!(view.preview().selected().is_none());
        assert!(view.files().iter().all(|f| f.id.as_str() != "2"));
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_file() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        backend.fail_deletes.store(true, Ordering::SeqCst);
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        let confirmation = view.request_delete(&id("3")).unwrap();
        view.confirm_delete(confirmation);
        view.settle().await;
        assert_eq!(view.files().len(), 3);
        assert_eq!(view.error(), Some("Failed to delete quote.docx."));
    }

    #[tokio::test]
    async fn download_writes_the_blob_to_disk() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        let (mut view, _urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;

        let dir = tempfile::tempdir().unwrap();
        assert!(view.download(&id("3"), dir.path()));
        let updates = view.settle().await;
        let expected = dir.path().join("quote.docx");
        assert_eq!(updates, vec![ViewUpdate::DownloadFinished { path: Some(expected.clone()) }]);
        assert_eq!(std::fs::read(expected).unwrap(), b"content of 3");
    }

    #[tokio::test]
    async fn answers_after_drop_are_discarded() {
        let backend = Arc::new(FakeBackend::with_files("17408", Category::Door, door_files()));
        backend.gate("1");
        let (mut view, urls) = view_with(backend.clone());
        view.open_category(Category::Door);
        view.settle().await;
        view.select_file(&id("1"));
        drop(view);

        backend.open_gate("1");
        tokio::task::yield_now().await;
        assert_eq!(urls.created(), 0);
    }
}
