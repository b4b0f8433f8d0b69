//! Client guard: decides what a protected view shows for the current
//! [`AuthState`].
//!
//! DESIGN
//! ======
//! - While verification is pending the view renders a neutral loading state;
//!   it never redirects on a guess.
//! - An unauthenticated user is sent to the login page once. The latch stays
//!   set until the user authenticates again, so re-renders do not stack
//!   navigations.
//! - A role mismatch keeps the session. The user goes back to where they came
//!   from when that is inside the dashboard, otherwise to the landing page.

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Url;

use super::routes::{RouteTable, normalize_path};
use crate::api::Role;
use crate::nav::Navigator;
use crate::session::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Verification pending: render neither content nor a redirect.
    Loading,
    Render,
    Navigate(String),
    /// Render nothing and stay put: already redirected to login, or the
    /// view is not allowed and there is no other page to fall back to.
    Hold,
}

#[derive(Debug)]
pub struct ClientGuard {
    routes: RouteTable,
    origin: Option<Url>,
    redirected: AtomicBool,
    was_authenticated: AtomicBool,
}

impl ClientGuard {
    #[must_use]
    pub fn new(routes: RouteTable, origin: &str) -> Self {
        let origin = match Url::parse(origin) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "unparseable public origin; referrers will be ignored");
                None
            }
        };
        Self { routes, origin, redirected: AtomicBool::new(false), was_authenticated: AtomicBool::new(false) }
    }

    /// Evaluate the guard for a view at `current_path` admitting `allowed_roles`
    /// (empty admits every authenticated user).
    pub fn check(
        &self,
        state: &AuthState,
        current_path: &str,
        allowed_roles: &[Role],
        referrer: Option<&str>,
    ) -> GuardDecision {
        if state.is_loading {
            return GuardDecision::Loading;
        }

        if !state.is_authenticated {
            self.was_authenticated.store(false, Ordering::SeqCst);
            if self.redirected.swap(true, Ordering::SeqCst) {
                return GuardDecision::Hold;
            }
            return GuardDecision::Navigate(self.routes.login_path().to_owned());
        }

        if !self.was_authenticated.swap(true, Ordering::SeqCst) {
            self.redirected.store(false, Ordering::SeqCst);
        }

        let role = state.role().unwrap_or_default();
        if allowed_roles.is_empty() || allowed_roles.contains(&role) {
            return GuardDecision::Render;
        }

        let target = self.fallback_target(current_path, referrer);
        if normalize_path(&target) == normalize_path(current_path) {
            tracing::info!(role = role.as_str(), %current_path, "role not allowed for view; no other page to return to");
            return GuardDecision::Hold;
        }
        tracing::info!(role = role.as_str(), %current_path, %target, "role not allowed for view");
        GuardDecision::Navigate(target)
    }

    /// [`Self::check`], performing any navigation through `navigator`.
    pub fn enforce(
        &self,
        state: &AuthState,
        current_path: &str,
        allowed_roles: &[Role],
        referrer: Option<&str>,
        navigator: &dyn Navigator,
    ) -> GuardDecision {
        let decision = self.check(state, current_path, allowed_roles, referrer);
        if let GuardDecision::Navigate(to) = &decision {
            navigator.navigate(to);
        }
        decision
    }

    fn fallback_target(&self, current_path: &str, referrer: Option<&str>) -> String {
        let landing = self.routes.landing_path().to_owned();
        let (Some(origin), Some(referrer)) = (self.origin.as_ref(), referrer) else {
            return landing;
        };
        let Ok(url) = origin.join(referrer) else {
            return landing;
        };
        if url.origin() != origin.origin() {
            return landing;
        }
        if normalize_path(url.path()) == normalize_path(current_path) {
            return landing;
        }
        match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_owned(),
        }
    }
}
