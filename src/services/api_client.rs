//! src/services/api_client.rs
//!
//! ApiClient: typed access to the tracker's REST backend. Every call builds
//! its URL from the configured base, logs the request line at debug level and
//! maps failures onto [`ApiError`]: transport failures, non-2xx answers
//! (message taken from the JSON `error` field when present) and undecodable
//! bodies are kept apart.

use crate::{
    errors::{ApiError, ApiResult},
    models::{Category, Project, ProjectDraft, ProjectFile, RecordId, StagedFile, Task, TaskDraft, TaskPatch},
    services::file_backend::{Blob, FileBackend, UploadRequest},
    view::task_board::TaskSource,
};
use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode, Url, header,
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Multipart field carrying each uploaded file.
pub const UPLOAD_FILES_FIELD: &str = "files";

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base` (e.g. `http://localhost:5000/api`).
    pub fn new(base: &str, timeout: Duration) -> ApiResult<Self> {
        let base = Url::parse(base).map_err(|_| ApiError::InvalidBase(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(base.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append percent-encoded path segments to the base.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Direct link to a file's bytes, usable by a browser or download tool.
    pub fn blob_url(&self, file_id: &RecordId) -> Url {
        self.endpoint(&["projects", "file", "blob", file_id.as_str()])
    }

    // --- Projects ---

    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.send_json(self.http.get(self.endpoint(&["projects"]))).await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> ApiResult<Project> {
        self.send_json(self.http.post(self.endpoint(&["projects"])).json(draft))
            .await
    }

    pub async fn update_project(&self, id: &RecordId, patch: &ProjectDraft) -> ApiResult<Project> {
        let url = self.endpoint(&["projects", id.as_str()]);
        self.send_json(self.http.put(url).json(patch)).await
    }

    pub async fn delete_project(&self, id: &RecordId) -> ApiResult<()> {
        let url = self.endpoint(&["projects", id.as_str()]);
        self.send_empty(self.http.delete(url)).await
    }

    // --- Files ---

    /// Whole-project listing kept by older backends.
    pub async fn list_project_files(&self, project_no: &str) -> ApiResult<Vec<ProjectFile>> {
        let url = self.endpoint(&["projects", "files", project_no]);
        self.send_json(self.http.get(url)).await
    }

    // --- Boards ---

    pub fn tasks(&self, category: Category) -> TaskApi {
        TaskApi {
            client: self.clone(),
            category,
        }
    }

    pub fn admin_projects(&self) -> AdminProjectsApi<'_> {
        AdminProjectsApi { client: self }
    }

    // --- Plumbing ---

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let request = request.build()?;
        debug!("{} {}", request.method(), request.url());
        let response = self.http.execute(request).await?;
        ensure_success(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        decode_json(response).await
    }

    async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl FileBackend for ApiClient {
    async fn list_files(&self, project_no: &str, category: Category) -> ApiResult<Vec<ProjectFile>> {
        let url = self.endpoint(&["projects", "files", project_no]);
        self.send_json(self.http.get(url).query(&[("category", category.as_str())]))
            .await
    }

    async fn fetch_blob(&self, file_id: &RecordId) -> ApiResult<Blob> {
        let fetch = async {
            let response = self.send(self.http.get(self.blob_url(file_id))).await?;
            let mime_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let bytes = response.bytes().await?;
            Ok::<_, ApiError>(Blob { bytes, mime_type })
        };
        fetch.await.map_err(ApiError::into_blob_fetch)
    }

    async fn upload(&self, request: &UploadRequest) -> ApiResult<Value> {
        let submit = async {
            let mut form = Form::new()
                .text("projectNo", request.project_no.clone())
                .text("category", request.category.as_str());
            for file in &request.files {
                form = form.part(UPLOAD_FILES_FIELD, file_part(file)?);
            }
            debug!(
                "uploading {} file(s), {} bytes, to {}/{}",
                request.files.len(),
                request.total_bytes(),
                request.project_no,
                request.category
            );
            self.send_json::<Value>(
                self.http
                    .post(self.endpoint(&["projects", "upload"]))
                    .multipart(form),
            )
            .await
        };
        submit.await.map_err(ApiError::into_upload)
    }

    async fn delete_file(&self, file_id: &RecordId) -> ApiResult<()> {
        let url = self.endpoint(&["projects", "file", file_id.as_str()]);
        self.send_empty(self.http.delete(url)).await
    }
}

/// Client for one stage's task board (`/{category}-tasks`).
#[derive(Clone, Debug)]
pub struct TaskApi {
    client: ApiClient,
    category: Category,
}

impl TaskApi {
    fn collection(&self) -> Url {
        let path = self.category.tasks_path();
        self.client.endpoint(&[path.trim_start_matches('/')])
    }

    fn item(&self, id: &RecordId) -> Url {
        let path = self.category.tasks_path();
        self.client
            .endpoint(&[path.trim_start_matches('/'), id.as_str()])
    }
}

#[async_trait]
impl TaskSource for TaskApi {
    fn category(&self) -> Category {
        self.category
    }

    async fn list(&self) -> ApiResult<Vec<Task>> {
        self.client
            .send_json(self.client.http.get(self.collection()))
            .await
    }

    async fn create(&self, draft: &TaskDraft) -> ApiResult<Task> {
        self.client
            .send_json(self.client.http.post(self.collection()).json(draft))
            .await
    }

    async fn update(&self, id: &RecordId, patch: &TaskPatch) -> ApiResult<Task> {
        self.client
            .send_json(self.client.http.patch(self.item(id)).json(patch))
            .await
    }

    async fn delete(&self, id: &RecordId) -> ApiResult<()> {
        self.client
            .send_empty(self.client.http.delete(self.item(id)))
            .await
    }
}

/// Client for the admin job table, keyed by job number. Rows are free-form
/// JSON objects whose columns are owned by the admin screen.
pub struct AdminProjectsApi<'a> {
    client: &'a ApiClient,
}

impl AdminProjectsApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Value>> {
        let url = self.client.endpoint(&["admin", "projects"]);
        self.client.send_json(self.client.http.get(url)).await
    }

    pub async fn create<T: Serialize + Sync>(&self, row: &T) -> ApiResult<Value> {
        let url = self.client.endpoint(&["admin", "projects"]);
        self.client
            .send_json(self.client.http.post(url).json(row))
            .await
    }

    pub async fn update<T: Serialize + Sync>(&self, job_no: &str, row: &T) -> ApiResult<Value> {
        let url = self.client.endpoint(&["admin", "projects", job_no]);
        self.client
            .send_json(self.client.http.put(url).json(row))
            .await
    }

    pub async fn delete(&self, job_no: &str) -> ApiResult<()> {
        let url = self.client.endpoint(&["admin", "projects", job_no]);
        self.client.send_empty(self.client.http.delete(url)).await
    }
}

fn file_part(file: &StagedFile) -> ApiResult<Part> {
    let mime = if file.mime_type.is_empty() {
        "application/octet-stream"
    } else {
        file.mime_type.as_str()
    };
    Ok(Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(mime)?)
}

/// Turn a non-2xx response into `ApiError::Server`, preferring the backend's
/// `{"error": "..."}` message, then the raw body, then the status text.
async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::server(status.as_u16(), error_message(status, &body)))
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("error") {
            return message.clone();
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

/// Decode a JSON body. Empty bodies (204) decode as JSON `null`, which
/// succeeds for `Option`/`Value` targets and is a parse error otherwise.
async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
