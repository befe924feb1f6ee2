//! HTTP client for the CipherStudio backend.

use cipherstudio_core::models::project::{files_to_wire, Project, ProjectSummary};
use cipherstudio_core::models::user::{AuthResponse, MeResponse};
use cipherstudio_core::text::is_loopback_host;
use cipherstudio_core::FileSet;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Failure talking to the backend.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// The server answered with a non-success status.
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The request never produced a usable response.
    Transport(String),
}

impl ApiError {
    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { status, message } => write!(f, "({}) {}", status, message),
            ApiError::Transport(message) => f.write_str(message),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

pub(crate) fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

pub(crate) fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

pub(crate) fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

/// `true` when a bearer token sent to `server` would cross the network in
/// plain text.
pub(crate) fn sends_token_in_clear(server: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(server) else {
        return false;
    };
    if !url.scheme().eq_ignore_ascii_case("http") {
        return false;
    }
    match url.host_str() {
        Some(host) => !is_loopback_host(host),
        None => false,
    }
}

/// Thin wrapper over `reqwest` that knows the API routes.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(
        server: String,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        if token.is_some() && sends_token_in_clear(&server) {
            eprintln!(
                "Warning: sending credentials to {} over plain http; prefer https for remote servers",
                server
            );
        }
        Ok(Self {
            http,
            server,
            token,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        api_url(&self.server, segments).map_err(ApiError::Transport)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let res = request.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => format!("failed to read error response body: {}", err),
        };
        Err(ApiError::Status {
            status,
            message: error_message_for_response(status, &body),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let res = self.send(request).await?;
        res.json()
            .await
            .map_err(|err| ApiError::Transport(format!("response decoding error: {}", err)))
    }

    /// Fetch the backend banner.
    pub(crate) async fn health(&self) -> Result<String, ApiError> {
        let res = self.send(self.http.get(self.url(&[])?)).await?;
        Ok(res.text().await?)
    }

    /// Fetch a project, mapping `404` to `None`.
    pub(crate) async fn get_project(&self, project_id: &str) -> Result<Option<Project>, ApiError> {
        let url = self.url(&["api", "projects", project_id])?;
        match self.send_json(self.http.get(url)).await {
            Ok(project) => Ok(Some(project)),
            Err(ApiError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Create or replace a project on the server.
    pub(crate) async fn put_project(
        &self,
        project_id: &str,
        name: &str,
        files: &FileSet,
    ) -> Result<Project, ApiError> {
        let url = self.url(&["api", "projects", project_id])?;
        let body = json!({ "name": name, "files": files_to_wire(files) });
        let envelope: ProjectEnvelope = self.send_json(self.http.put(url).json(&body)).await?;
        Ok(envelope.project)
    }

    pub(crate) async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        let url = self.url(&["api", "projects"])?;
        self.send_json(self.http.get(url)).await
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.url(&["api", "auth", "register"])?;
        let body = json!({ "username": username, "email": email, "password": password });
        self.send_json(self.http.post(url).json(&body)).await
    }

    /// Sign in by username, or by email when no username is given.
    pub(crate) async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.url(&["api", "auth", "login"])?;
        let body = json!({ "username": username, "email": email, "password": password });
        self.send_json(self.http.post(url).json(&body)).await
    }

    pub(crate) async fn me(&self) -> Result<MeResponse, ApiError> {
        let url = self.url(&["api", "auth", "me"])?;
        self.send_json(self.http.get(url)).await
    }
}
