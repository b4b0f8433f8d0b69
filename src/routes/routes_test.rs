use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::Request;
use tower::ServiceExt;

use super::*;
use crate::api::{ApiError, SettingsApi, SiteSettings};
use crate::config::DashboardConfig;

struct Unreachable;

#[async_trait::async_trait]
impl SettingsApi for Unreachable {
    async fn public_settings(&self) -> Result<SiteSettings, ApiError> {
        Err(ApiError::Network("connection refused".into()))
    }
}

fn state() -> AppState {
    let config = DashboardConfig { dashboard_dir: std::env::temp_dir().join("charity-dashboard-missing"), ..DashboardConfig::default() };
    AppState::new(config, Arc::new(Unreachable))
}

fn get_req(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_is_public() {
    let response = app(state()).oneshot(get_req("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn theme_css_serves_root_variables() {
    let state = state();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let response = app(state).oneshot(get_req("/theme.css")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let css = String::from_utf8(body.to_vec()).unwrap();
    assert!(css.starts_with(":root {"));
    assert!(css.contains("--main-color: #3B82F6;"));
    assert!(css.contains("--main-color-hover: rgb(79,150,255);"));
}

#[tokio::test]
async fn protected_section_redirects_without_flag() {
    let response = app(state()).oneshot(get_req("/projects")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}
