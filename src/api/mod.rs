//! Backend REST API: wire types, errors, and the client traits.
//!
//! ARCHITECTURE
//! ============
//! The dashboard core never talks HTTP directly. `AuthSession` depends on
//! [`AuthApi`] and `SettingsStore` on [`SettingsApi`]; production wiring uses
//! [`HttpBackend`], tests substitute in-memory mocks.

pub mod error;
pub mod http;
pub mod types;

pub use error::ApiError;
pub use http::{ApiTimeouts, HttpBackend};
pub use types::{ContactInfo, LoginRequest, LoginResponse, Role, SiteSettings, User};

/// Authentication endpoints of the backend.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /users/me`: the profile of the session owner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when there is no valid session.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns a client rejection for bad credentials, or a network/server
    /// error when the backend could not be reached.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/logout`: invalidate the current session.
    ///
    /// # Errors
    ///
    /// Returns any transport or status failure; callers treat it as best-effort.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /auth/logout-all`: invalidate every session of the user.
    ///
    /// # Errors
    ///
    /// Returns any transport or status failure; callers treat it as best-effort.
    async fn logout_all(&self) -> Result<(), ApiError>;
}

/// Public settings endpoint of the backend.
#[async_trait::async_trait]
pub trait SettingsApi: Send + Sync {
    /// `GET /settings/public`.
    ///
    /// # Errors
    ///
    /// Returns any transport, status, or decode failure.
    async fn public_settings(&self) -> Result<SiteSettings, ApiError>;
}
