use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::*;
use crate::api::ApiError;

// =============================================================================
// MockSettingsApi
// =============================================================================

#[derive(Default)]
struct MockSettingsApi {
    /// Scripted responses as (delay ms, result); empty means a 500.
    responses: Mutex<VecDeque<(u64, Result<SiteSettings, ApiError>)>>,
}

impl MockSettingsApi {
    fn scripted(responses: Vec<(u64, Result<SiteSettings, ApiError>)>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses.into()) })
    }
}

#[async_trait::async_trait]
impl SettingsApi for MockSettingsApi {
    async fn public_settings(&self) -> Result<SiteSettings, ApiError> {
        let next = self.responses.lock().unwrap().pop_front();
        let (delay_ms, result) = next.unwrap_or((0, Err(ApiError::Server { status: 500 })));
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        result
    }
}

fn site(name: &str, color: &str) -> SiteSettings {
    SiteSettings {
        website_name: name.into(),
        main_color: Some(color.into()),
        ..SiteSettings::default()
    }
}

// =============================================================================
// fetch_settings
// =============================================================================

#[tokio::test]
async fn fetch_replaces_settings_and_stamps_attempt() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![(0, Ok(site("Hope", "#10B981")))]));

    assert_eq!(store.fetch_settings().await, FetchOutcome::Updated);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.settings, Some(site("Hope", "#10B981")));
    assert_eq!(snapshot.main_color(), Some("#10B981"));
    assert!(snapshot.error.is_none());
    assert!(!snapshot.is_loading);
    assert!(snapshot.last_attempt.is_some());
}

#[tokio::test]
async fn failure_after_success_retains_prior_values() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![
        (0, Ok(site("Hope", "#10B981"))),
        (0, Err(ApiError::Network("connection refused".into()))),
    ]));

    store.fetch_settings().await;
    assert_eq!(store.fetch_settings().await, FetchOutcome::Retained);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.settings, Some(site("Hope", "#10B981")));
    assert!(snapshot.error.as_deref().is_some_and(|e| e.contains("connection refused")));
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn success_clears_previous_error() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![
        (0, Err(ApiError::Timeout)),
        (0, Ok(site("Hope", "#10B981"))),
    ]));

    store.fetch_settings().await;
    assert!(store.snapshot().error.is_some());
    assert!(store.settings().is_none());

    store.fetch_settings().await;
    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn late_response_never_overwrites_newer_one() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![
        (60, Ok(site("Old", "#000000"))),
        (0, Ok(site("New", "#FFFFFF"))),
    ]));

    let (slow, fast) = tokio::join!(store.fetch_settings(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.fetch_settings().await
    });

    assert_eq!(slow, FetchOutcome::Superseded);
    assert_eq!(fast, FetchOutcome::Updated);
    assert_eq!(store.settings().map(|s| s.website_name), Some("New".to_owned()));
}

// =============================================================================
// clear
// =============================================================================

#[tokio::test]
async fn clear_drops_settings_and_in_flight_response() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![
        (0, Ok(site("Hope", "#10B981"))),
        (40, Ok(site("Hope", "#10B981"))),
    ]));
    store.fetch_settings().await;

    let (outcome, ()) = tokio::join!(store.fetch_settings(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.clear();
    });

    assert_eq!(outcome, FetchOutcome::Superseded);
    assert_eq!(store.snapshot(), SettingsSnapshot::default());
}

#[tokio::test]
async fn updates_after_observers_are_gone_do_not_panic() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![(0, Ok(site("Hope", "#10B981")))]));
    drop(store.subscribe());
    assert_eq!(store.fetch_settings().await, FetchOutcome::Updated);
}

#[tokio::test]
async fn subscribers_see_each_update() {
    let store = SettingsStore::new(MockSettingsApi::scripted(vec![(0, Ok(site("Hope", "#10B981")))]));
    let mut rx = store.subscribe();

    store.fetch_settings().await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().main_color(), Some("#10B981"));
}
