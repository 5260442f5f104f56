//! API client for the green finance backend.
//!
//! Every request carries the session's bearer token when there is one.
//! Failures come back as `ApiError`; callers hand them to
//! `ApiError::apply` to get the user-facing notice.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::ApiError;
use crate::auth::Identity;
use crate::listing::{ListTable, ListView, TableRow, LIST_PAGE_SIZE};
use crate::models::{
    Announcement, Captcha, ExceptionLog, ListBody, LoginLog, LoginRequest, LoginResponse,
    MessageResponse, OperationLog, Organization, ProcessDefinition, ProcessInstance, ReportRow,
    Role, TaskItem, TaskSearchItem, WorkflowVariable,
};

// ============================================================================
// Constants
// ============================================================================

/// Backend base URL when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the credential exchange; its 401 is a wrong password, not an
/// expired session.
pub const LOGIN_ENDPOINT: &str = "/auth/login";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests. An empty token
    /// means anonymous.
    pub fn set_token(&mut self, token: &str) {
        self.token = (!token.is_empty()).then(|| token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Copy of this client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: &str) -> Self {
        let mut client = self.clone();
        client.set_token(token);
        client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> ApiResult<T> {
        let response = builder.send().await?;
        debug!(path, status = %response.status(), "Response received");
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path), path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(self.request(Method::POST, path).json(body), path).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::POST, path), path).await
    }

    // ===== Authentication =====

    /// Exchange credentials for a token and the user's profile.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        captcha: Option<&str>,
    ) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            captcha: captcha.map(str::to_string),
        };
        let response: LoginResponse = self.post(LOGIN_ENDPOINT, &body).await?;
        info!(username, superuser = response.user.is_superuser, "Login succeeded");
        Ok(response)
    }

    /// Tell the backend the session is over.
    pub async fn logout(&self) -> ApiResult<MessageResponse> {
        self.post_empty("/auth/logout").await
    }

    pub async fn current_user(&self) -> ApiResult<Identity> {
        self.get("/auth/me").await
    }

    pub async fn captcha(&self) -> ApiResult<String> {
        let captcha: Captcha = self.get("/auth/captcha").await?;
        Ok(captcha.captcha)
    }

    // ===== Announcements =====

    /// Announcements currently shown on the dashboard ticker.
    pub async fn fetch_active_announcements(&self) -> ApiResult<Vec<Announcement>> {
        self.get("/announcements/scroll/active").await
    }

    // ===== List pages =====

    /// First page of the list behind `view`.
    pub async fn fetch_list(&self, view: ListView) -> ApiResult<ListTable> {
        match view {
            ListView::PendingTasks | ListView::CompletedTasks | ListView::ArchivedTasks => {
                self.fetch_table::<TaskItem>(view).await
            }
            ListView::TaskQuery => self.fetch_table::<TaskSearchItem>(view).await,
            ListView::OnlineReport => self.fetch_table::<ReportRow>(view).await,
            ListView::Users => self.fetch_table::<Identity>(view).await,
            ListView::Roles => self.fetch_table::<Role>(view).await,
            ListView::Organizations => self.fetch_table::<Organization>(view).await,
            ListView::OperationLogs => self.fetch_table::<OperationLog>(view).await,
            ListView::LoginLogs => self.fetch_table::<LoginLog>(view).await,
            ListView::ExceptionLogs => self.fetch_table::<ExceptionLog>(view).await,
            ListView::ProcessDefinitions => self.fetch_table::<ProcessDefinition>(view).await,
            ListView::ProcessInstances => self.fetch_table::<ProcessInstance>(view).await,
            ListView::WorkflowVariables => self.fetch_table::<WorkflowVariable>(view).await,
        }
    }

    fn list_request(&self, view: ListView) -> RequestBuilder {
        self.request(Method::GET, view.endpoint())
            .query(&[("page", 1), ("page_size", LIST_PAGE_SIZE)])
    }

    async fn fetch_table<T: TableRow + DeserializeOwned>(&self, view: ListView) -> ApiResult<ListTable> {
        let body: ListBody<T> = self.send(self.list_request(view), view.endpoint()).await?;
        let (rows, total) = body.into_parts();
        debug!(?view, rows = rows.len(), total, "List fetched");
        Ok(ListTable::from_rows(view, &rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://backend:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://backend:8000/api");
        assert_eq!(client.url(LOGIN_ENDPOINT), "http://backend:8000/api/auth/login");
    }

    #[test]
    fn test_empty_token_is_anonymous() {
        let mut client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        client.set_token("");
        assert!(client.token.is_none());

        let authed = client.with_token("jwt");
        assert_eq!(authed.token.as_deref(), Some("jwt"));
        assert!(client.token.is_none());
    }

    #[test]
    fn test_bearer_header_attached() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap().with_token("jwt");
        let request = client.request(Method::GET, "/auth/me").build().unwrap();
        assert_eq!(
            request.headers()[header::AUTHORIZATION].to_str().unwrap(),
            "Bearer jwt"
        );

        let anonymous = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let request = anonymous.request(Method::GET, "/auth/me").build().unwrap();
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_list_request_asks_for_first_page() {
        let client = ApiClient::new("http://backend:8000/api").unwrap().with_token("jwt");
        let request = client.list_request(ListView::LoginLogs).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://backend:8000/api/logs/logins?page=1&page_size=100"
        );
        assert!(request.headers().contains_key(header::AUTHORIZATION));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout), "{err:?}");
        assert!(!err.notice(false).redirect_to_login);
    }
}
