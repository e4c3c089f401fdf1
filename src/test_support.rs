//! In-memory doubles shared by the unit tests.

use crate::{
    errors::{ApiError, ApiResult},
    models::{Category, ProjectFile, RecordId},
    services::{
        file_backend::{Blob, FileBackend, UploadRequest},
        object_urls::ObjectUrlManager,
    },
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tokio::sync::Notify;

#[derive(Default)]
struct UrlLedger {
    created: usize,
    released: Vec<String>,
    live: HashSet<String>,
    max_live: usize,
}

/// Object URL manager that only keeps accounts.
#[derive(Default)]
pub struct CountingUrls {
    ledger: Mutex<UrlLedger>,
}

impl CountingUrls {
    pub fn created(&self) -> usize {
        self.ledger.lock().unwrap().created
    }

    pub fn released(&self) -> Vec<String> {
        self.ledger.lock().unwrap().released.clone()
    }

    pub fn live(&self) -> usize {
        self.ledger.lock().unwrap().live.len()
    }

    pub fn max_live(&self) -> usize {
        self.ledger.lock().unwrap().max_live
    }
}

impl ObjectUrlManager for CountingUrls {
    fn create(&self, _blob: Blob) -> String {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.created += 1;
        let url = format!("mem://preview/{}", ledger.created);
        ledger.live.insert(url.clone());
        ledger.max_live = ledger.max_live.max(ledger.live.len());
        url
    }

    fn release(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        let mut ledger = self.ledger.lock().unwrap();
        ledger.released.push(url.to_string());
        ledger.live.remove(url);
    }
}

pub fn file(id: &str, name: &str, mime: &str, category: Category) -> ProjectFile {
    ProjectFile {
        id: RecordId::from(id),
        file_name: name.to_string(),
        mime_type: mime.to_string(),
        file_size: 1024,
        category: Some(category),
        project_no: "17408".to_string(),
    }
}

/// Scriptable backend with call accounting.
#[derive(Default)]
pub struct FakeBackend {
    pub files: Mutex<HashMap<(String, Category), Vec<ProjectFile>>>,
    pub list_calls: Mutex<Vec<(String, Category)>>,
    pub blob_calls: Mutex<Vec<RecordId>>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub deletes: Mutex<Vec<RecordId>>,
    pub failing_blobs: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub fail_lists: AtomicBool,
    pub fail_uploads: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub upload_count: AtomicUsize,
}

impl FakeBackend {
    pub fn with_files(project_no: &str, category: Category, files: Vec<ProjectFile>) -> Self {
        let backend = Self::default();
        backend.set_files(project_no, category, files);
        backend
    }

    pub fn set_files(&self, project_no: &str, category: Category, files: Vec<ProjectFile>) {
        self.files
            .lock()
            .unwrap()
            .insert((project_no.to_string(), category), files);
    }

    /// Hold blob fetches for `file_id` until [`FakeBackend::open_gate`].
    pub fn gate(&self, file_id: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(file_id.to_string(), Arc::new(Notify::new()));
    }

    pub fn open_gate(&self, file_id: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(file_id) {
            gate.notify_one();
        }
    }

    pub fn fail_blob(&self, file_id: &str) {
        self.failing_blobs.lock().unwrap().insert(file_id.to_string());
    }

    pub fn list_calls_for(&self, project_no: &str, category: Category) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, c)| p == project_no && *c == category)
            .count()
    }

    pub fn blob_call_count(&self) -> usize {
        self.blob_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FileBackend for FakeBackend {
    async fn list_files(&self, project_no: &str, category: Category) -> ApiResult<Vec<ProjectFile>> {
        self.list_calls
            .lock()
            .unwrap()
            .push((project_no.to_string(), category));
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::server(500, "database offline"));
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&(project_no.to_string(), category))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_blob(&self, file_id: &RecordId) -> ApiResult<Blob> {
        self.blob_calls.lock().unwrap().push(file_id.clone());
        let gate = self.gates.lock().unwrap().get(file_id.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_blobs.lock().unwrap().contains(file_id.as_str()) {
            return Err(ApiError::Network("connection reset".into()).into_blob_fetch());
        }
        Ok(Blob::new(format!("content of {}", file_id).into_bytes(), "image/png"))
    }

    async fn upload(&self, request: &UploadRequest) -> ApiResult<Value> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ApiError::server(413, "File too large").into_upload());
        }
        self.uploads.lock().unwrap().push(request.clone());
        let mut files = self.files.lock().unwrap();
        let entry = files
            .entry((request.project_no.clone(), request.category))
            .or_default();
        for staged in &request.files {
            let id = format!("up-{}", entry.len() + 1);
            entry.push(ProjectFile {
                id: RecordId::from(id),
                file_name: staged.name.clone(),
                mime_type: staged.mime_type.clone(),
                file_size: staged.size,
                category: Some(request.category),
                project_no: request.project_no.clone(),
            });
        }
        Ok(json!({ "message": "uploaded", "count": request.files.len() }))
    }

    async fn delete_file(&self, file_id: &RecordId) -> ApiResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ApiError::server(500, "delete failed"));
        }
        self.deletes.lock().unwrap().push(file_id.clone());
        for files in self.files.lock().unwrap().values_mut() {
            files.retain(|f| &f.id != file_id);
        }
        Ok(())
    }
}
