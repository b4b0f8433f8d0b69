//! Auth-session state machine for the current dashboard user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards read [`AuthState`]; the settings refetcher listens for
//! [`AuthEvent`]s; the edge guard reads the flag cookie this module writes.
//!
//! STATE MACHINE
//! =============
//! `Unverified -> Verifying -> {Authenticated, Unauthenticated}`, then
//! `Authenticated <-> Unauthenticated` through `login` and the logout calls.
//! Verification runs once per session object.
//!
//! TRADE-OFFS
//! ==========
//! A fresh snapshot plus a live flag cookie is trusted without a network
//! round-trip. The snapshot max age bounds how stale that trust can be, and
//! the first 401 anywhere clears it through `handle_auth_error`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{OnceCell, watch};

use super::events::{AuthEvent, AuthEvents};
use super::mirror::{SessionMirror, UserSnapshot, now_unix};
use crate::api::{ApiError, AuthApi, LoginRequest, Role, User};
use crate::nav::Navigator;

pub const SESSION_EXPIRED_KIND: &str = "session_expired";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unverified,
    Verifying,
    Authenticated,
    Unauthenticated,
}

/// Observable auth state. Built only through the constructors below so the
/// flags always agree with the phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// True until verification resolves; guards render a neutral state meanwhile.
    pub is_loading: bool,
}

impl AuthState {
    fn with_phase(phase: AuthPhase) -> Self {
        Self {
            phase,
            user: None,
            is_authenticated: false,
            is_loading: matches!(phase, AuthPhase::Unverified | AuthPhase::Verifying),
        }
    }

    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { phase: AuthPhase::Authenticated, user: Some(user), is_authenticated: true, is_loading: false }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::with_phase(AuthPhase::Unauthenticated)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::with_phase(AuthPhase::Unverified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub login_path: String,
    /// Maximum snapshot age trusted without a network call; zero disables the fast path.
    pub snapshot_max_age: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { login_path: "/login".to_owned(), snapshot_max_age: Duration::from_secs(12 * 60 * 60) }
    }
}

/// Canonical payload shown when a session expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionExpired {
    pub kind: &'static str,
    pub message: String,
}

impl Default for SessionExpired {
    fn default() -> Self {
        Self { kind: SESSION_EXPIRED_KIND, message: SESSION_EXPIRED_MESSAGE.to_owned() }
    }
}

/// Login failure other than rejected credentials.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login service unavailable: {0}")]
    Unavailable(#[from] ApiError),
}

#[derive(Debug, Clone, Copy)]
enum SignOutScope {
    ThisDevice,
    AllDevices,
}

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    mirror: Arc<dyn SessionMirror>,
    navigator: Arc<dyn Navigator>,
    events: AuthEvents,
    config: SessionConfig,
    state: watch::Sender<AuthState>,
    verified: OnceCell<()>,
    /// Bumped by every explicit transition; a verification that started in
    /// an older epoch must not overwrite a newer outcome.
    epoch: AtomicU64,
}

impl AuthSession {
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        mirror: Arc<dyn SessionMirror>,
        navigator: Arc<dyn Navigator>,
        events: AuthEvents,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { api, mirror, navigator, events, config, state, verified: OnceCell::new(), epoch: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Resolve the initial auth state. Only the first call does any work;
    /// concurrent callers wait on that same call.
    pub async fn verify(&self) {
        self.verified.get_or_init(|| self.run_verification()).await;
    }

    async fn run_verification(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.state.send_replace(AuthState::with_phase(AuthPhase::Verifying));

        if let Some(user) = self.trusted_snapshot() {
            tracing::debug!(user_id = %user.id, "session restored from snapshot");
            self.apply_if_current(epoch, AuthState::authenticated(user));
            return;
        }

        let previous = self.mirror.snapshot();
        match self.api.current_user().await {
            Ok(user) => {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    tracing::debug!("verification superseded by a newer transition");
                    return;
                }
                tracing::info!(user_id = %user.id, "session verified");
                let remember_me = previous.is_some_and(|s| s.remember_me);
                self.mirror.persist(&UserSnapshot::new(user.clone(), remember_me));
                self.state.send_replace(AuthState::authenticated(user));
            }
            Err(e) => {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    tracing::debug!("verification superseded by a newer transition");
                    return;
                }
                tracing::info!(error = %e, "session verification failed; treating as signed out");
                self.mirror.clear();
                self.state.send_replace(AuthState::unauthenticated());
            }
        }
    }

    fn trusted_snapshot(&self) -> Option<User> {
        if !self.mirror.auth_flag() {
            return None;
        }
        let snapshot = self.mirror.snapshot()?;
        snapshot
            .is_fresh_at(self.config.snapshot_max_age, now_unix())
            .then_some(snapshot.user)
    }

    fn apply_if_current(&self, epoch: u64, next: AuthState) {
        if self.epoch.load(Ordering::SeqCst) == epoch {
            self.state.send_replace(next);
        }
    }

    /// Sign in with credentials.
    ///
    /// Returns `Ok(false)` when the backend rejects the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Unavailable`] when the backend cannot be reached
    /// or fails, so callers can tell "try again" apart from "wrong password".
    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> Result<bool, LoginError> {
        let request = LoginRequest::new(email, password, remember_me);
        let response = match self.api.login(&request).await {
            Ok(response) => response,
            Err(e) if e.is_credential_rejection() => {
                tracing::info!(email = %request.email, error = %e, "login rejected");
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                return Err(LoginError::Unavailable(e));
            }
        };

        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch after login failed; using login response");
                response.user
            }
        };

        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.mirror.persist(&UserSnapshot::new(user.clone(), remember_me));
        tracing::info!(user_id = %user.id, remember_me, "logged in");
        self.state.send_replace(AuthState::authenticated(user));
        self.events.publish(AuthEvent::LoggedIn);
        Ok(true)
    }

    /// Sign out this device. Local state is cleared even if the backend call fails.
    pub async fn logout(&self) {
        self.sign_out(SignOutScope::ThisDevice).await;
    }

    /// Sign out every device of the user, with the same local-clear contract as [`Self::logout`].
    pub async fn logout_all_devices(&self) {
        self.sign_out(SignOutScope::AllDevices).await;
    }

    async fn sign_out(&self, scope: SignOutScope) {
        let result = match scope {
            SignOutScope::ThisDevice => self.api.logout().await,
            SignOutScope::AllDevices => self.api.logout_all().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, ?scope, "backend logout failed; clearing local session anyway");
        }

        self.reset_local();
        tracing::info!(?scope, "logged out");
        self.events.publish(AuthEvent::LoggedOut);
        self.navigator.navigate(&self.config.login_path);
    }

    /// Clear all local auth state after a 401 and return the message to show.
    /// Navigation is left to the caller.
    pub fn handle_auth_error(&self) -> SessionExpired {
        self.reset_local();
        tracing::info!("session expired");
        self.events.publish(AuthEvent::SessionExpired);
        SessionExpired::default()
    }

    /// Route an API error through [`Self::handle_auth_error`] when it signals
    /// an expired session.
    pub fn handle_api_error(&self, err: &ApiError) -> Option<SessionExpired> {
        err.is_session_expired().then(|| self.handle_auth_error())
    }

    fn reset_local(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.mirror.clear();
        self.state.send_replace(AuthState::unauthenticated());
    }
}
