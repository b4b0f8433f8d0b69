//! Client session lifecycle.
//!
//! ARCHITECTURE
//! ============
//! `AuthSession` is the only writer of the session mirror (flag cookie plus
//! user snapshot). Other components observe it through a `watch` receiver
//! for state and a `broadcast` receiver for transition events.

pub mod auth;
pub mod events;
pub mod mirror;

pub use auth::{AuthPhase, AuthSession, AuthState, LoginError, SessionConfig, SessionExpired};
pub use events::{AuthEvent, AuthEvents};
pub use mirror::{AUTH_COOKIE_NAME, MemoryMirror, SessionMirror, USER_SNAPSHOT_KEY, UserSnapshot};
