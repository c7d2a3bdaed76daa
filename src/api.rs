//! HTTP client for the task API.
//!
//! All task operations carry `Authorization: Bearer <token>` from an
//! explicit [`Session`]; login and register do not. Non-2xx responses are
//! turned into [`Error::Api`] by reading the optional `msg` field from the
//! body, falling back to a fixed per-operation string.
//!
//! There is deliberately no retry, timeout, or caching layer here: every
//! call maps one-to-one onto a user action.

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::session::Session;
use crate::task::{EditBuffer, Task, TaskDraft, TaskId};
use crate::{tlog_debug, Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Error bodies may carry a human-readable message.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/login", self.base_url);
        tlog_debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Login failed").await);
        }

        let body: LoginResponse = response.json().await?;
        Ok(Session::new(body.token))
    }

    /// Create a new account.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let url = format!("{}/auth/register", self.base_url);
        tlog_debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Registration failed").await);
        }
        Ok(())
    }

    /// Fetch the full task collection. Order is whatever the server returns.
    pub async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>> {
        let url = format!("{}/tasks", self.base_url);
        tlog_debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Failed to fetch tasks").await);
        }
        Ok(response.json().await?)
    }

    /// Create a task. Success is exactly HTTP 201; any other status is a
    /// failure even if nominally 2xx.
    pub async fn create_task(&self, session: &Session, draft: &TaskDraft) -> Result<()> {
        let url = format!("{}/tasks", self.base_url);
        tlog_debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, session.bearer())
            .json(draft)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response, "Task creation failed").await);
        }
        Ok(())
    }

    /// Overwrite a task's editable fields with the edit buffer.
    pub async fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        buffer: &EditBuffer,
    ) -> Result<()> {
        let url = format!("{}/tasks/{}", self.base_url, id);
        tlog_debug!("PUT {}", url);
        let response = self
            .http
            .put(&url)
            .header(AUTHORIZATION, session.bearer())
            .json(buffer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Task update failed").await);
        }
        Ok(())
    }

    pub async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<()> {
        let url = format!("{}/tasks/{}", self.base_url, id);
        tlog_debug!("DELETE {}", url);
        let response = self
            .http
            .delete(&url)
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Task deletion failed").await);
        }
        Ok(())
    }
}

/// Convert a non-success response into `Error::Api`, preferring the server's
/// `msg` field over the fallback text.
async fn api_error(response: Response, fallback: &str) -> Error {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.msg)
        .unwrap_or_else(|| fallback.to_string());
    tlog_debug!("API error: HTTP {} - {}", status, message);
    Error::Api { status, message }
}
