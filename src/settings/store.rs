//! Site settings store.
//!
//! DESIGN
//! ======
//! One global [`SiteSettings`] value, replaced wholesale by each fetch and
//! published on a `watch` channel. Every fetch takes a generation number when
//! it starts; a response is applied only if no newer fetch or `clear()`
//! started in the meantime, so a slow response can never overwrite a newer
//! one.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::time::Instant;

use crate::api::{SettingsApi, SiteSettings};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSnapshot {
    pub settings: Option<SiteSettings>,
    /// Message of the last failed fetch; reset by the next success.
    pub error: Option<String>,
    pub is_loading: bool,
    /// Start of the last fetch attempt, successful or not.
    pub last_attempt: Option<Instant>,
}

impl SettingsSnapshot {
    #[must_use]
    pub fn main_color(&self) -> Option<&str> {
        self.settings.as_ref().and_then(|s| s.main_color.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Updated,
    /// The fetch failed; prior settings are kept and `error` is set.
    Retained,
    /// A newer fetch or a clear started first; this response was dropped.
    Superseded,
}

#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn SettingsApi>,
    state: watch::Sender<SettingsSnapshot>,
    generation: AtomicU64,
}

impl SettingsStore {
    #[must_use]
    pub fn new(api: Arc<dyn SettingsApi>) -> Self {
        let (state, _) = watch::channel(SettingsSnapshot::default());
        Self { inner: Arc::new(Inner { api, state, generation: AtomicU64::new(0) }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn settings(&self) -> Option<SiteSettings> {
        self.inner.state.borrow().settings.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.inner.state.subscribe()
    }

    /// Fetch `/settings/public` and replace the stored value.
    pub async fn fetch_settings(&self) -> FetchOutcome {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| {
            s.is_loading = true;
            s.last_attempt = Some(Instant::now());
        });

        let result = self.inner.api.public_settings().await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "dropping superseded settings response");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(settings) => {
                tracing::debug!(website = %settings.website_name, "site settings updated");
                self.inner.state.send_modify(|s| {
                    s.settings = Some(settings);
                    s.error = None;
                    s.is_loading = false;
                });
                FetchOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(error = %e, "site settings fetch failed; keeping previous values");
                self.inner.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.is_loading = false;
                });
                FetchOutcome::Retained
            }
        }
    }

    /// Drop the stored settings. In-flight fetches started before this call
    /// are discarded when they complete.
    pub fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(SettingsSnapshot::default());
        tracing::debug!("site settings cleared");
    }
}
