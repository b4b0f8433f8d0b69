//! reqwest-backed implementation of the backend traits.
//!
//! Sessions are carried either by backend-set cookies (reqwest cookie store)
//! or by a bearer token returned from login. The token lives only in memory
//! and is dropped on logout regardless of the backend's answer.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{LoginRequest, LoginResponse, SiteSettings, User, decode_body};
use super::{AuthApi, SettingsApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// Build a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), token: RwLock::new(None) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = token;
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(ApiError::from_status(status, &body));
        }
        decode_body(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpBackend {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.send_json(self.http.get(self.url("/users/me"))).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .send_json(self.http.post(self.url("/auth/login")).json(request))
            .await?;
        if response.token.is_some() {
            self.set_token(response.token.clone());
        }
        Ok(response)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.send_empty(self.http.post(self.url("/auth/logout"))).await;
        self.set_token(None);
        result
    }

    async fn logout_all(&self) -> Result<(), ApiError> {
        let result = self.send_empty(self.http.post(self.url("/auth/logout-all"))).await;
        self.set_token(None);
        result
    }
}

#[async_trait::async_trait]
impl SettingsApi for HttpBackend {
    async fn public_settings(&self) -> Result<SiteSettings, ApiError> {
        self.send_json(self.http.get(self.url("/settings/public"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, ApiTimeouts { request_secs: 1, connect_secs: 1 }).unwrap()
    }

    #[test]
    fn url_joins_without_double_slash() {
        let api = backend("http://localhost:8000/api/");
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert_eq!(api.url("/users/me"), "http://localhost:8000/api/users/me");
        assert_eq!(api.url("settings/public"), "http://localhost:8000/api/settings/public");
    }

    #[test]
    fn token_is_replaced_and_cleared() {
        let api = backend("http://localhost:8000");
        api.set_token(Some("abc".into()));
        assert_eq!(api.token.read().unwrap().as_deref(), Some("abc"));
        api.set_token(None);
        assert!(api.token.read().unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = backend("http://127.0.0.1:9");
        let err = api.current_user().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout), "unexpected error: {err:?}");
        assert!(!err.is_session_expired());
    }
}
