//! Typed auth transition events.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn,
    /// Explicit logout, on this device or all devices.
    LoggedOut,
    /// A 401 cleared the mirror outside an explicit logout.
    SessionExpired,
}

#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: AuthEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::debug!(?event, delivered, "auth event");
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        AuthEvents::new().publish(AuthEvent::LoggedOut);
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let events = AuthEvents::new();
        let mut rx = events.subscribe();
        events.publish(AuthEvent::LoggedIn);
        events.publish(AuthEvent::SessionExpired);
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::LoggedIn);
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SessionExpired);
    }
}
