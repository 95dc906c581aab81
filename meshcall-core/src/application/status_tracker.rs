use crate::domain::ConnectionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayLink {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaOutcome {
    Pending,
    Acquired,
    Skipped,
    Failed,
}

/// Derives the user-visible call status from relay and capture outcomes
///
/// Every input returns the new status only when it actually changed.
#[derive(Debug, Clone)]
pub struct ConnectionStatusTracker {
    relay: RelayLink,
    media: MediaOutcome,
    current: ConnectionStatus,
}

impl ConnectionStatusTracker {
    pub fn new() -> Self {
        Self {
            relay: RelayLink::Disconnected,
            media: MediaOutcome::Pending,
            current: ConnectionStatus::Disconnected,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.current
    }

    pub fn relay_connecting(&mut self) -> Option<ConnectionStatus> {
        self.relay = RelayLink::Connecting;
        self.recompute()
    }

    pub fn relay_connected(&mut self) -> Option<ConnectionStatus> {
        self.relay = RelayLink::Connected;
        self.recompute()
    }

    pub fn relay_disconnected(&mut self) -> Option<ConnectionStatus> {
        self.relay = RelayLink::Disconnected;
        self.recompute()
    }

    pub fn media_acquired(&mut self) -> Option<ConnectionStatus> {
        self.media = MediaOutcome::Acquired;
        self.recompute()
    }

    pub fn media_failed(&mut self) -> Option<ConnectionStatus> {
        self.media = MediaOutcome::Failed;
        self.recompute()
    }

    /// Joining without local media was chosen explicitly
    pub fn media_skipped(&mut self) -> Option<ConnectionStatus> {
        self.media = MediaOutcome::Skipped;
        self.recompute()
    }

    /// Back to the initial state (after leaving)
    pub fn reset(&mut self) -> Option<ConnectionStatus> {
        self.relay = RelayLink::Disconnected;
        self.media = MediaOutcome::Pending;
        self.recompute()
    }

    fn derive(&self) -> ConnectionStatus {
        match (self.media, self.relay) {
            (MediaOutcome::Failed, _) => ConnectionStatus::MediaError,
            (_, RelayLink::Disconnected) => ConnectionStatus::Disconnected,
            (_, RelayLink::Connecting) => ConnectionStatus::Connecting,
            (MediaOutcome::Pending, RelayLink::Connected) => ConnectionStatus::Connecting,
            (MediaOutcome::Acquired | MediaOutcome::Skipped, RelayLink::Connected) => {
                ConnectionStatus::Connected
            }
        }
    }

    fn recompute(&mut self) -> Option<ConnectionStatus> {
        let next = self.derive();
        if next == self.current {
            return None;
        }
        tracing::info!("📶 Status {} -> {}", self.current, next);
        self.current = next;
        Some(next)
    }
}

impl Default for ConnectionStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        assert_eq!(
            ConnectionStatusTracker::new().status(),
            ConnectionStatus::Disconnected
        );
    }

    #[test]
    fn test_happy_path() {
        let mut tracker = ConnectionStatusTracker::new();
        assert_eq!(tracker.relay_connecting(), Some(ConnectionStatus::Connecting));
        assert_eq!(tracker.relay_connected(), None);
        assert_eq!(tracker.media_acquired(), Some(ConnectionStatus::Connected));
    }

    #[test]
    fn test_media_error_dominates() {
        let mut tracker = ConnectionStatusTracker::new();
        tracker.relay_connected();
        assert_eq!(tracker.media_failed(), Some(ConnectionStatus::MediaError));
        assert_eq!(tracker.relay_disconnected(), None);
        assert_eq!(tracker.status(), ConnectionStatus::MediaError);
    }

    #[test]
    fn test_skipped_media_counts_as_ready() {
        let mut tracker = ConnectionStatusTracker::new();
        tracker.relay_connected();
        assert_eq!(tracker.media_skipped(), Some(ConnectionStatus::Connected));
    }

    #[test]
    fn test_relay_loss_and_recovery() {
        let mut tracker = ConnectionStatusTracker::new();
        tracker.relay_connected();
        tracker.media_acquired();

        assert_eq!(
            tracker.relay_disconnected(),
            Some(ConnectionStatus::Disconnected)
        );
        assert_eq!(tracker.relay_connecting(), Some(ConnectionStatus::Connecting));
        assert_eq!(tracker.relay_connected(), Some(ConnectionStatus::Connected));
    }

    #[test]
    fn test_reset() {
        let mut tracker = ConnectionStatusTracker::new();
        tracker.relay_connected();
        tracker.media_failed();
        assert_eq!(tracker.reset(), Some(ConnectionStatus::Disconnected));
        assert_eq!(tracker.reset(), None);
    }
}
