//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! owns the settings store, the handle of the refetch task that keeps it
//! fresh, and the style map the theme projection writes into. Building it
//! spawns both background tasks, so it must be created inside a runtime.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::SettingsApi;
use crate::config::DashboardConfig;
use crate::guard::EdgeGuard;
use crate::session::AuthEvents;
use crate::settings::{RefetchHandle, SettingsStore, spawn_refetch_task};
use crate::theme::{StyleMap, spawn_theme_projection};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub guard: Arc<EdgeGuard>,
    pub settings: SettingsStore,
    pub refetch: RefetchHandle,
    pub theme: Arc<StyleMap>,
    /// Publisher for auth transitions of sessions hosted in this process.
    pub auth_events: AuthEvents,
}

impl AppState {
    #[must_use]
    pub fn new(config: DashboardConfig, settings_api: Arc<dyn SettingsApi>) -> Self {
        let auth_events = AuthEvents::new();
        let settings = SettingsStore::new(settings_api);

        let (refetch, refetch_task) =
            spawn_refetch_task(settings.clone(), config.refetch_policy(), auth_events.subscribe());
        let _refetch_watch = supervise("settings_refetch", refetch_task);

        let theme = Arc::new(StyleMap::new());
        let projection =
            spawn_theme_projection(settings.subscribe(), theme.clone(), config.default_main_color.clone());
        let _projection_watch = supervise("theme_projection", projection);

        Self {
            guard: Arc::new(config.edge_guard()),
            config: Arc::new(config),
            settings,
            refetch,
            theme,
            auth_events,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    Finished,
    Panicked,
    Cancelled,
}

/// Await a background task and log how it ended. A panic is logged at
/// `error` instead of vanishing with a dropped handle.
pub fn supervise(task: &'static str, handle: JoinHandle<()>) -> JoinHandle<TaskExit> {
    tokio::spawn(async move {
        match handle.await {
            Ok(()) => {
                tracing::debug!(task, "background task finished");
                TaskExit::Finished
            }
            Err(e) if e.is_panic() => {
                tracing::error!(task, error = %e, "background task panicked");
                TaskExit::Panicked
            }
            Err(e) => {
                tracing::warn!(task, error = %e, "background task cancelled");
                TaskExit::Cancelled
            }
        }
    })
}
