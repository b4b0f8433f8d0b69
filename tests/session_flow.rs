//! End-to-end flow: login mirrors the session into the flag cookie, the
//! edge guard honours it, and logout revokes it and resets site settings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use charity_dashboard::api::{ApiError, AuthApi, LoginRequest, LoginResponse, Role, SettingsApi, SiteSettings, User};
use charity_dashboard::config::DashboardConfig;
use charity_dashboard::guard::{ClientGuard, GuardDecision};
use charity_dashboard::nav::MemoryHistory;
use charity_dashboard::routes;
use charity_dashboard::session::{AuthSession, MemoryMirror};
use charity_dashboard::state::AppState;
use tower::ServiceExt;

// =============================================================================
// Backend fakes
// =============================================================================

fn coordinator() -> User {
    User { id: "42".into(), name: "Sara".into(), email: "sara@charity.org".into(), role: Role::Subadmin }
}

struct FakeAuth;

#[async_trait::async_trait]
impl AuthApi for FakeAuth {
    async fn current_user(&self) -> Result<User, ApiError> {
        Ok(coordinator())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        if request.password == "correct horse" {
            Ok(LoginResponse { user: coordinator(), token: Some("t0k3n".into()) })
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Err(ApiError::Server { status: 502 })
    }

    async fn logout_all(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeSettings {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl SettingsApi for FakeSettings {
    async fn public_settings(&self) -> Result<SiteSettings, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SiteSettings {
            website_name: format!("Hope Foundation #{call}"),
            main_color: Some("#10B981".into()),
            ..SiteSettings::default()
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

fn page(path: &str, mirror: &MemoryMirror) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = mirror.request_cookie_header() {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn config() -> DashboardConfig {
    DashboardConfig {
        dashboard_dir: std::env::temp_dir().join("charity-dashboard-flow"),
        ..DashboardConfig::default()
    }
}

// =============================================================================
// Flow
// =============================================================================

#[tokio::test]
async fn login_guard_logout_round_trip() {
    let config = config();
    let settings_api = Arc::new(FakeSettings::default());
    let state = AppState::new(config.clone(), settings_api.clone());
    let app = routes::app(state.clone());

    let mirror = Arc::new(MemoryMirror::new(config.cookie_secure));
    let history = Arc::new(MemoryHistory::new());
    let session = AuthSession::new(
        Arc::new(FakeAuth),
        mirror.clone(),
        history.clone(),
        state.auth_events.clone(),
        config.session_config(),
    );

    state.refetch.mounted();
    settle().await;
    assert_eq!(settings_api.calls.load(Ordering::SeqCst), 1);

    // Signed out: the edge guard bounces protected sections.
    let response = app.clone().oneshot(page("/projects", &mirror)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    // Wrong password is not an error and changes nothing.
    assert!(!session.login("sara@charity.org", "nope", false).await.unwrap());
    assert!(mirror.request_cookie_header().is_none());

    assert!(session.login(" sara@charity.org ", "correct horse", false).await.unwrap());
    let response = app.clone().oneshot(page("/projects/9", &mirror)).await.unwrap();
    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "private, max-age=30, must-revalidate"
    );
    let response = app.clone().oneshot(page("/login", &mirror)).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/");

    // The subadmin is kept out of an admin-only view without losing the session.
    let guard = ClientGuard::new(config.route_table(), &config.public_origin);
    let decision = guard.enforce(&session.state(), "/settings", &[Role::Admin], Some("/projects/9"), history.as_ref());
    assert_eq!(decision, GuardDecision::Navigate("/projects/9".into()));
    assert!(session.state().is_authenticated);

    // Backend logout fails (502); the local session is cleared regardless.
    session.logout().await;
    settle().await;

    assert!(!session.state().is_authenticated);
    assert_eq!(history.current().as_deref(), Some("/login"));
    let response = app.clone().oneshot(page("/projects", &mirror)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    assert_eq!(settings_api.calls.load(Ordering::SeqCst), 2, "logout refetches settings");
    assert_eq!(
        state.settings.settings().map(|s| s.website_name),
        Some("Hope Foundation #2".to_owned())
    );
}

#[tokio::test]
async fn expired_session_redirects_on_next_page_load() {
    let config = config();
    let state = AppState::new(config.clone(), Arc::new(FakeSettings::default()));
    let app = routes::app(state.clone());
    let mirror = Arc::new(MemoryMirror::new(false));
    let session = AuthSession::new(
        Arc::new(FakeAuth),
        mirror.clone(),
        Arc::new(MemoryHistory::new()),
        state.auth_events.clone(),
        config.session_config(),
    );

    session.login("sara@charity.org", "correct horse", true).await.unwrap();
    assert!(mirror.set_cookie_header().unwrap().contains("Max-Age=2592000"));

    let expired = session.handle_api_error(&ApiError::Unauthorized).unwrap();
    assert_eq!(expired.kind, "session_expired");

    let response = app.oneshot(page("/messages", &mirror)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}
