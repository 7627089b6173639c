//! REST client for the CompanyCam v2 API.
//!
//! The bearer token is set by the caller (see [`CompanyCamApi::set_api_token`])
//! and sent with every request. Paginated endpoints take `page` (1-based)
//! and `per_page`.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    Comment, Company, Group, Photo, PhotoUpdate, PhotoUpload, Project, ProjectFilters,
    ProjectInput, Tag, User,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.companycam.com/v2";

/// Errors from the CompanyCam client.
#[derive(Debug, thiserror::Error)]
pub enum CompanyCamError {
    /// No API token has been configured.
    #[error("CompanyCam API token is not set")]
    MissingToken,

    /// CompanyCam answered 429.
    #[error("CompanyCam rate limit exceeded")]
    RateLimited,

    /// CompanyCam returned any other non-2xx status.
    #[error("CompanyCam API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// HTTP client for one CompanyCam account.
#[derive(Clone)]
pub struct CompanyCamApi {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl CompanyCamApi {
    /// Create a client against `base_url`, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn set_api_token(&mut self, token: impl Into<String>) {
        self.api_token = Some(token.into());
    }

    pub fn clear_api_token(&mut self) {
        self.api_token = None;
    }

    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- company / users / groups ----

    /// `GET /company`
    pub async fn get_company(&self) -> Result<Company, CompanyCamError> {
        self.get("/company", &NO_QUERY).await
    }

    /// `GET /users`
    pub async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<User>, CompanyCamError> {
        self.get("/users", &page_query(page, per_page)).await
    }

    /// `GET /groups`
    pub async fn list_groups(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Group>, CompanyCamError> {
        self.get("/groups", &page_query(page, per_page)).await
    }

    // ---- projects ----

    /// `GET /projects`, narrowed by `filters`.
    pub async fn list_projects(
        &self,
        page: u32,
        per_page: u32,
        filters: &ProjectFilters,
    ) -> Result<Vec<Project>, CompanyCamError> {
        let query = ProjectListQuery {
            page,
            per_page,
            query: filters.query.as_deref(),
            modified_since: filters.modified_since,
        };
        self.get("/projects", &query).await
    }

    /// `POST /projects`
    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project, CompanyCamError> {
        self.send_json(Method::POST, "/projects", input).await
    }

    /// `GET /projects/{id}`
    pub async fn get_project(&self, id: &str) -> Result<Project, CompanyCamError> {
        self.get(&format!("/projects/{id}"), &NO_QUERY).await
    }

    /// `PUT /projects/{id}`
    pub async fn update_project(
        &self,
        id: &str,
        input: &ProjectInput,
    ) -> Result<Project, CompanyCamError> {
        self.send_json(Method::PUT, &format!("/projects/{id}"), input)
            .await
    }

    /// `DELETE /projects/{id}`
    pub async fn delete_project(&self, id: &str) -> Result<(), CompanyCamError> {
        self.delete(&format!("/projects/{id}")).await
    }

    // ---- photos ----

    /// `GET /projects/{id}/photos`
    pub async fn list_project_photos(
        &self,
        project_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Photo>, CompanyCamError> {
        self.get(
            &format!("/projects/{project_id}/photos"),
            &page_query(page, per_page),
        )
        .await
    }

    /// `POST /projects/{id}/photos`
    pub async fn upload_photo(
        &self,
        project_id: &str,
        upload: &PhotoUpload,
    ) -> Result<Photo, CompanyCamError> {
        let body = serde_json::json!({ "photo": upload });
        self.send_json(Method::POST, &format!("/projects/{project_id}/photos"), &body)
            .await
    }

    /// `GET /photos/{id}`
    pub async fn get_photo(&self, id: &str) -> Result<Photo, CompanyCamError> {
        self.get(&format!("/photos/{id}"), &NO_QUERY).await
    }

    /// `PUT /photos/{id}`
    pub async fn update_photo(
        &self,
        id: &str,
        update: &PhotoUpdate,
    ) -> Result<Photo, CompanyCamError> {
        let body = serde_json::json!({ "photo": update });
        self.send_json(Method::PUT, &format!("/photos/{id}"), &body)
            .await
    }

    /// `DELETE /photos/{id}`
    pub async fn delete_photo(&self, id: &str) -> Result<(), CompanyCamError> {
        self.delete(&format!("/photos/{id}")).await
    }

    // ---- tags / comments ----

    /// `GET /tags`
    pub async fn list_tags(&self, page: u32, per_page: u32) -> Result<Vec<Tag>, CompanyCamError> {
        self.get("/tags", &page_query(page, per_page)).await
    }

    /// `POST /tags`
    pub async fn create_tag(&self, display_value: &str) -> Result<Tag, CompanyCamError> {
        let body = serde_json::json!({ "tag": { "display_value": display_value } });
        self.send_json(Method::POST, "/tags", &body).await
    }

    /// `GET /photos/{id}/comments`
    pub async fn list_photo_comments(
        &self,
        photo_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Comment>, CompanyCamError> {
        self.get(
            &format!("/photos/{photo_id}/comments"),
            &page_query(page, per_page),
        )
        .await
    }

    /// `POST /photos/{id}/comments`
    pub async fn add_photo_comment(
        &self,
        photo_id: &str,
        content: &str,
    ) -> Result<Comment, CompanyCamError> {
        let body = serde_json::json!({ "comment": { "content": content } });
        self.send_json(Method::POST, &format!("/photos/{photo_id}/comments"), &body)
            .await
    }

    // ---- private helpers ----

    /// Start an authenticated request to `path` (relative to the base URL).
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CompanyCamError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(CompanyCamError::MissingToken)?;
        Ok(self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn get<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, CompanyCamError> {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Self::parse_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, CompanyCamError> {
        let response = self.request(method, path)?.json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), CompanyCamError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Map non-2xx responses to [`CompanyCamError`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CompanyCamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompanyCamError::RateLimited);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(CompanyCamError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CompanyCamError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

const NO_QUERY: [(&str, u32); 0] = [];

fn page_query(page: u32, per_page: u32) -> [(&'static str, u32); 2] {
    [("page", page), ("per_page", per_page)]
}

/// Query string of `GET /projects`.
#[derive(Serialize)]
struct ProjectListQuery<'a> {
    page: u32,
    per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified_since: Option<i64>,
}

/// Pull a human-readable message out of an error body.
///
/// Prefers a JSON `message` or `error` string, then a JSON `errors` array,
/// then the raw body, then the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        if let Some(errors) = value.get("errors").and_then(|v| v.as_array()) {
            let joined: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !joined.is_empty() {
                return joined.join("; ");
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
