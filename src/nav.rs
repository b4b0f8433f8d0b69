//! Navigation seam between the auth core and whatever router hosts it.

use std::sync::Mutex;

/// Performs client-side navigation to an in-app path.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// In-memory history for hosts without a browser router.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    visits: Mutex<Vec<String>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent navigation target, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.visits
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for MemoryHistory {
    fn navigate(&self, path: &str) {
        tracing::debug!(%path, "navigate");
        self.visits
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_owned());
    }
}
