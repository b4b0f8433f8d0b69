//! Edge guard: cookie-hint redirects before any dashboard code runs.
//!
//! DESIGN
//! ======
//! The guard reads only the `isAuthenticated` flag cookie. It never calls
//! the backend, so it can be wrong in the optimistic direction (stale flag);
//! the client guard and the first 401 correct that. Redirect responses are
//! marked uncacheable so a browser never replays a redirect computed for a
//! different auth state.

#[cfg(test)]
#[path = "edge_test.rs"]
mod tests;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::routes::{RouteClass, RouteTable};
use crate::session::mirror::auth_flag_from_headers;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Serve the request untouched.
    Pass,
    /// Serve, marking the response as a short-lived private cache entry.
    PassPrivate,
    /// Redirect (307) to the given path.
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct EdgeGuard {
    routes: RouteTable,
    auth_cache_max_age_secs: u64,
}

impl EdgeGuard {
    #[must_use]
    pub fn new(routes: RouteTable, auth_cache_max_age_secs: u64) -> Self {
        Self { routes, auth_cache_max_age_secs }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn decide(&self, path: &str, authenticated: bool) -> EdgeDecision {
        match (self.routes.classify(path), authenticated) {
            (RouteClass::Protected, false) => EdgeDecision::Redirect(self.routes.login_path().to_owned()),
            (RouteClass::Protected, true) => EdgeDecision::PassPrivate,
            (RouteClass::Login, true) => EdgeDecision::Redirect(self.routes.landing_path().to_owned()),
            (RouteClass::Login | RouteClass::Public, _) => EdgeDecision::Pass,
        }
    }

    fn private_cache_control(&self) -> HeaderValue {
        let value = format!("private, max-age={}, must-revalidate", self.auth_cache_max_age_secs);
        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("private, must-revalidate"))
    }
}

/// Axum middleware applying [`EdgeGuard::decide`] to every request.
pub async fn edge_guard(State(guard): State<Arc<EdgeGuard>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let authenticated = auth_flag_from_headers(req.headers());
    let decision = guard.decide(&path, authenticated);
    tracing::debug!(%path, authenticated, ?decision, "edge guard");

    match decision {
        EdgeDecision::Pass => next.run(req).await,
        EdgeDecision::PassPrivate => {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, guard.private_cache_control());
            response
        }
        EdgeDecision::Redirect(to) => no_store_redirect(&to),
    }
}

fn no_store_redirect(to: &str) -> Response {
    let mut response = Redirect::temporary(to).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
