//! Session mirror: the non-authoritative copy of auth status.
//!
//! DESIGN
//! ======
//! Two slots, both written only by `AuthSession`:
//! - the `isAuthenticated` flag cookie, readable by the edge guard before
//!   any page code runs (presence hint only, never a secret);
//! - the `userData` snapshot, used by `verify()` as an optimistic fast path.
//!
//! Neither slot is trusted on its own for business logic; the backend's
//! `/users/me` remains the authority.

#[cfg(test)]
#[path = "mirror_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::api::User;

pub const AUTH_COOKIE_NAME: &str = "isAuthenticated";
pub const USER_SNAPSHOT_KEY: &str = "userData";
const REMEMBER_ME_DAYS: i64 = 30;

/// Last known profile, persisted next to the flag cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user: User,
    /// Unix seconds at which the snapshot was written.
    pub saved_at: i64,
    #[serde(default)]
    pub remember_me: bool,
}

impl UserSnapshot {
    #[must_use]
    pub fn new(user: User, remember_me: bool) -> Self {
        Self { user, saved_at: now_unix(), remember_me }
    }

    /// Whether the snapshot may stand in for a network verification.
    /// A zero `max_age` disables the fast path; future timestamps are never trusted.
    #[must_use]
    pub fn is_fresh_at(&self, max_age: Duration, now: i64) -> bool {
        if max_age.is_zero() {
            return false;
        }
        u64::try_from(now - self.saved_at).is_ok_and(|age| age <= max_age.as_secs())
    }
}

pub(crate) fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Storage for the session mirror.
pub trait SessionMirror: Send + Sync {
    /// Current value of the flag cookie.
    fn auth_flag(&self) -> bool;

    /// Stored user snapshot, if present and readable.
    fn snapshot(&self) -> Option<UserSnapshot>;

    /// Write the snapshot and set the flag cookie.
    fn persist(&self, snapshot: &UserSnapshot);

    /// Remove the snapshot and expire the flag cookie.
    fn clear(&self);
}

/// Build the flag cookie set on successful verification or login.
/// `remember_me` keeps it for 30 days; otherwise it lives for the browser session.
#[must_use]
pub fn auth_flag_cookie(secure: bool, remember_me: bool) -> Cookie<'static> {
    let builder = Cookie::build((AUTH_COOKIE_NAME, "true"))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure);
    if remember_me {
        builder.max_age(time::Duration::days(REMEMBER_ME_DAYS)).build()
    } else {
        builder.build()
    }
}

/// Build the immediately-expiring cookie that clears the flag.
#[must_use]
pub fn cleared_auth_flag_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Read the flag from request headers, as the edge guard sees it.
#[must_use]
pub fn auth_flag_from_headers(headers: &HeaderMap) -> bool {
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE_NAME)
        .is_some_and(|c| c.value() == "true")
}

fn cookie_is_live(cookie: &Cookie<'_>) -> bool {
    cookie.value() == "true" && cookie.max_age() != Some(time::Duration::ZERO)
}

/// Mirror held in process memory, standing in for browser cookie + storage.
#[derive(Debug)]
pub struct MemoryMirror {
    secure: bool,
    slots: Mutex<MirrorSlots>,
}

#[derive(Debug, Default)]
struct MirrorSlots {
    cookie: Option<Cookie<'static>>,
    storage: HashMap<String, String>,
}

impl MemoryMirror {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self { secure, slots: Mutex::new(MirrorSlots::default()) }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, MirrorSlots> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// `Set-Cookie` value of the last cookie write.
    #[must_use]
    pub fn set_cookie_header(&self) -> Option<String> {
        self.slots().cookie.as_ref().map(ToString::to_string)
    }

    /// `Cookie` request header a browser would send with this mirror.
    #[must_use]
    pub fn request_cookie_header(&self) -> Option<String> {
        self.slots()
            .cookie
            .as_ref()
            .filter(|c| cookie_is_live(c))
            .map(|c| format!("{}={}", c.name(), c.value()))
    }

    #[must_use]
    pub fn storage_item(&self, key: &str) -> Option<String> {
        self.slots().storage.get(key).cloned()
    }

    /// Seed a raw storage entry, e.g. a snapshot left by an earlier page load.
    pub fn set_storage_item(&self, key: &str, value: &str) {
        self.slots().storage.insert(key.to_owned(), value.to_owned());
    }

    /// Seed the flag cookie as left by an earlier page load.
    pub fn restore_flag(&self, remember_me: bool) {
        self.slots().cookie = Some(auth_flag_cookie(self.secure, remember_me));
    }
}

impl SessionMirror for MemoryMirror {
    fn auth_flag(&self) -> bool {
        self.slots().cookie.as_ref().is_some_and(cookie_is_live)
    }

    fn snapshot(&self) -> Option<UserSnapshot> {
        let raw = self.storage_item(USER_SNAPSHOT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable user snapshot");
                None
            }
        }
    }

    fn persist(&self, snapshot: &UserSnapshot) {
        let cookie = auth_flag_cookie(self.secure, snapshot.remember_me);
        let mut slots = self.slots();
        match serde_json::to_string(snapshot) {
            Ok(raw) => {
                slots.storage.insert(USER_SNAPSHOT_KEY.to_owned(), raw);
            }
            Err(e) => tracing::warn!(error = %e, "user snapshot not persisted"),
        }
        slots.cookie = Some(cookie);
    }

    fn clear(&self) {
        let mut slots = self.slots();
        slots.storage.remove(USER_SNAPSHOT_KEY);
        slots.cookie = Some(cleared_auth_flag_cookie(self.secure));
    }
}
