//! Background refetching of site settings.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views report mounts, navigations and focus changes through a
//! [`RefetchHandle`]; [`AuthSession`](crate::session::AuthSession) reports
//! logouts and expiries through its `AuthEvent` broadcast. Both feed a single
//! task that owns the refetch decision, so callers never wait on a fetch.
//!
//! TRADE-OFFS
//! ==========
//! Mount and focus triggers are throttled by a staleness window; logout
//! triggers are not, because the settings a signed-out visitor sees may
//! differ from the ones an admin saw.

#[cfg(test)]
#[path = "refetch_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::store::SettingsStore;
use crate::guard::routes::normalize_path;
use crate::session::AuthEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefetchTrigger {
    /// A settings consumer mounted.
    Mount,
    /// Client-side navigation to a path.
    Navigated(String),
    LoggedOut,
    /// The session mirror was cleared outside an explicit logout.
    MirrorCleared,
    /// The window or tab regained focus.
    FocusRegained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefetchPolicy {
    pub stale_after: Duration,
    pub login_path: String,
}

impl RefetchPolicy {
    #[must_use]
    pub fn new(stale_after: Duration, login_path: &str) -> Self {
        Self { stale_after, login_path: normalize_path(login_path) }
    }

    #[must_use]
    pub fn is_stale(&self, last_attempt: Option<Instant>, now: Instant) -> bool {
        last_attempt.is_none_or(|at| now.saturating_duration_since(at) >= self.stale_after)
    }

    #[must_use]
    pub fn should_refetch(
        &self,
        trigger: &RefetchTrigger,
        last_attempt: Option<Instant>,
        now: Instant,
        logout_suspected: bool,
    ) -> bool {
        match trigger {
            RefetchTrigger::Mount => self.is_stale(last_attempt, now),
            RefetchTrigger::Navigated(path) => normalize_path(path) == self.login_path,
            RefetchTrigger::LoggedOut | RefetchTrigger::MirrorCleared => true,
            RefetchTrigger::FocusRegained => logout_suspected || self.is_stale(last_attempt, now),
        }
    }
}

/// Sender side of the refetch task. Cheap to clone; the task stops once
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct RefetchHandle {
    tx: mpsc::UnboundedSender<RefetchTrigger>,
}

impl RefetchHandle {
    pub fn notify(&self, trigger: RefetchTrigger) {
        if self.tx.send(trigger).is_err() {
            tracing::debug!("refetch task stopped; trigger dropped");
        }
    }

    pub fn mounted(&self) {
        self.notify(RefetchTrigger::Mount);
    }

    pub fn navigated(&self, path: &str) {
        self.notify(RefetchTrigger::Navigated(path.to_owned()));
    }

    pub fn focus_regained(&self) {
        self.notify(RefetchTrigger::FocusRegained);
    }

    pub fn mirror_cleared(&self) {
        self.notify(RefetchTrigger::MirrorCleared);
    }
}

/// Spawn the task that turns triggers and auth events into settings fetches.
#[must_use]
pub fn spawn_refetch_task(
    store: SettingsStore,
    policy: RefetchPolicy,
    auth_events: broadcast::Receiver<AuthEvent>,
) -> (RefetchHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(store, policy, rx, auth_events));
    (RefetchHandle { tx }, task)
}

async fn run(
    store: SettingsStore,
    policy: RefetchPolicy,
    mut triggers: mpsc::UnboundedReceiver<RefetchTrigger>,
    mut auth_events: broadcast::Receiver<AuthEvent>,
) {
    let mut logout_suspected = false;
    let mut events_open = true;
    let mut last_dispatch: Option<Instant> = None;

    loop {
        let trigger = tokio::select! {
            next = triggers.recv() => match next {
                Some(trigger) => trigger,
                None => break,
            },
            event = auth_events.recv(), if events_open => match event {
                Ok(AuthEvent::LoggedIn) => {
                    logout_suspected = false;
                    continue;
                }
                Ok(AuthEvent::LoggedOut) => RefetchTrigger::LoggedOut,
                Ok(AuthEvent::SessionExpired) => RefetchTrigger::MirrorCleared,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "auth events lagged; refetching settings");
                    RefetchTrigger::MirrorCleared
                }
                Err(RecvError::Closed) => {
                    events_open = false;
                    continue;
                }
            },
        };

        if trigger == RefetchTrigger::LoggedOut {
            store.clear();
        }
        if matches!(trigger, RefetchTrigger::LoggedOut | RefetchTrigger::MirrorCleared) {
            logout_suspected = true;
        }

        let now = Instant::now();
        let last_attempt = store.snapshot().last_attempt.max(last_dispatch);
        if !policy.should_refetch(&trigger, last_attempt, now, logout_suspected) {
            tracing::trace!(?trigger, "settings refetch skipped");
            continue;
        }
        if trigger == RefetchTrigger::FocusRegained {
            logout_suspected = false;
        }

        tracing::debug!(?trigger, "refetching site settings");
        last_dispatch = Some(now);
        let store = store.clone();
        tokio::spawn(async move {
            store.fetch_settings().await;
        });
    }

    tracing::debug!("settings refetch task stopped");
}
