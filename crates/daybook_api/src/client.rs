//! Typed async client for the Daybook HTTP API.
//!
//! Mirrors the router one method per route. Non-2xx answers surface as
//! [`ClientError::Status`] carrying the server's `detail` text.

use crate::error::ErrorBody;
use crate::wire::{
    CalendarParams, DbCheck, DevUserResponse, DiaryListParams, HealthReport, RootStatus,
    TaskListParams,
};
use daybook_core::{
    DiaryEntry, DiaryEntryId, Folder, FolderId, FolderPatch, MonthGrid, NewDiaryEntry, NewFolder,
    NewNote, NewSubstep, NewTask, SubstepId, SubstepPatch, Task, TaskId, TaskNote, TaskPatch,
    TaskSubstep,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::{Display, Formatter};

/// Client-side failure.
#[derive(Debug)]
pub enum ClientError {
    /// Server answered with a non-success status.
    Status { status: StatusCode, detail: String },
    /// Transport, TLS or body decoding failure.
    Http(reqwest::Error),
}

impl ClientError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, detail } => write!(f, "server answered {status}: {detail}"),
            Self::Http(err) => write!(f, "request failed: {err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// HTTP client bound to one server base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    /// Creates a client over a preconfigured `reqwest::Client`.
    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn root(&self) -> ClientResult<RootStatus> {
        self.send_json(self.request(Method::GET, "/")).await
    }

    pub async fn health(&self) -> ClientResult<HealthReport> {
        self.send_json(self.request(Method::GET, "/health")).await
    }

    pub async fn test_db(&self) -> ClientResult<DbCheck> {
        self.send_json(self.request(Method::GET, "/test-db")).await
    }

    /// Gets or creates the dev user. Does not change this client's token.
    pub async fn create_dev_user(&self) -> ClientResult<DevUserResponse> {
        self.send_json(self.request(Method::POST, "/test/create-user"))
            .await
    }

    pub async fn list_tasks(&self, folder_id: Option<FolderId>) -> ClientResult<Vec<Task>> {
        let params = TaskListParams { folder_id };
        self.send_json(self.request(Method::GET, "/api/tasks").query(&params))
            .await
    }

    pub async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        self.send_json(self.request(Method::POST, "/api/tasks").json(task))
            .await
    }

    pub async fn get_task(&self, id: TaskId) -> ClientResult<Task> {
        self.send_json(self.request(Method::GET, &format!("/api/tasks/{id}")))
            .await
    }

    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ClientResult<Task> {
        self.send_json(
            self.request(Method::PUT, &format!("/api/tasks/{id}"))
                .json(patch),
        )
        .await
    }

    pub async fn delete_task(&self, id: TaskId) -> ClientResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/tasks/{id}")))
            .await
    }

    pub async fn add_substep(
        &self,
        task_id: TaskId,
        substep: &NewSubstep,
    ) -> ClientResult<TaskSubstep> {
        self.send_json(
            self.request(Method::POST, &format!("/api/tasks/{task_id}/substeps"))
                .json(substep),
        )
        .await
    }

    pub async fn update_substep(
        &self,
        task_id: TaskId,
        substep_id: SubstepId,
        patch: &SubstepPatch,
    ) -> ClientResult<TaskSubstep> {
        self.send_json(
            self.request(
                Method::PUT,
                &format!("/api/tasks/{task_id}/substeps/{substep_id}"),
            )
            .json(patch),
        )
        .await
    }

    pub async fn delete_substep(&self, task_id: TaskId, substep_id: SubstepId) -> ClientResult<()> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("/api/tasks/{task_id}/substeps/{substep_id}"),
        ))
        .await
    }

    pub async fn add_note(&self, task_id: TaskId, content: &str) -> ClientResult<TaskNote> {
        self.send_json(
            self.request(Method::POST, &format!("/api/tasks/{task_id}/notes"))
                .json(&NewNote::new(content)),
        )
        .await
    }

    pub async fn list_folders(&self) -> ClientResult<Vec<Folder>> {
        self.send_json(self.request(Method::GET, "/api/folders"))
            .await
    }

    pub async fn create_folder(&self, folder: &NewFolder) -> ClientResult<Folder> {
        self.send_json(self.request(Method::POST, "/api/folders").json(folder))
            .await
    }

    pub async fn update_folder(&self, id: FolderId, patch: &FolderPatch) -> ClientResult<Folder> {
        self.send_json(
            self.request(Method::PUT, &format!("/api/folders/{id}"))
                .json(patch),
        )
        .await
    }

    pub async fn delete_folder(&self, id: FolderId) -> ClientResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/folders/{id}")))
            .await
    }

    pub async fn list_diary(&self, params: &DiaryListParams) -> ClientResult<Vec<DiaryEntry>> {
        self.send_json(self.request(Method::GET, "/api/diary").query(params))
            .await
    }

    /// Saves into the entry's `(date, folder)` slot, replacing any
    /// existing entry there.
    pub async fn save_diary(&self, entry: &NewDiaryEntry) -> ClientResult<DiaryEntry> {
        self.send_json(self.request(Method::POST, "/api/diary").json(entry))
            .await
    }

    pub async fn get_diary(&self, id: DiaryEntryId) -> ClientResult<DiaryEntry> {
        self.send_json(self.request(Method::GET, &format!("/api/diary/{id}")))
            .await
    }

    pub async fn delete_diary(&self, id: DiaryEntryId) -> ClientResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/diary/{id}")))
            .await
    }

    pub async fn calendar_month(&self, params: &CalendarParams) -> ClientResult<MonthGrid> {
        self.send_json(self.request(Method::GET, "/api/calendar").query(params))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.detail)
        .unwrap_or(text);
    Err(ClientError::Status { status, detail })
}
