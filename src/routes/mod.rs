//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The built dashboard is served as static files with an SPA fallback to
//! `index.html`. Every request passes the edge guard first, so protected
//! sections never reach a visitor without the auth flag cookie.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::guard::edge_guard;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let dashboard_dir = state.config.dashboard_dir.clone();
    let assets = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(dashboard_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/theme.css", get(theme_css))
        .fallback_service(assets)
        .layer(from_fn_with_state(state.guard.clone(), edge_guard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Accent variables as a stylesheet. Counts as a settings mount, so a stale
/// value is refreshed in the background for the next request.
async fn theme_css(State(state): State<AppState>) -> impl IntoResponse {
    state.refetch.mounted();
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8"), (header::CACHE_CONTROL, "no-cache")],
        state.theme.to_css(),
    )
}
