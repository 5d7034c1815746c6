//! Engine counters exposed through the detailed health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counters for realtime activity.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Total connections ever opened.
    connections_opened: AtomicU64,
    /// Total connections closed.
    connections_closed: AtomicU64,
    /// Private messages relayed.
    messages_relayed: AtomicU64,
    /// Game invitations sent.
    invites_sent: AtomicU64,
    /// Game sessions started.
    games_started: AtomicU64,
    /// Game sessions that reached a terminal state.
    games_completed: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub connections_active: u64,
    pub messages_relayed: u64,
    pub invites_sent: u64,
    pub games_started: u64,
    pub games_completed: u64,
}

impl RealtimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_relayed(&self) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invite_sent(&self) {
        self.invites_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_game_started(&self) {
        self.games_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_game_completed(&self) {
        self.games_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters. Active connections derive from the
    /// opened/closed pair, saturating if a close races ahead of an open.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);

        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            connections_active: opened.saturating_sub(closed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            invites_sent: self.invites_sent.load(Ordering::Relaxed),
            games_started: self.games_started.load(Ordering::Relaxed),
            games_completed: self.games_completed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = RealtimeMetrics::new();
        metrics.record_connection_opened();
        metrics.record_connection_opened();
        metrics.record_connection_closed();
        metrics.record_game_started();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_opened, 2);
        assert_eq!(snap.connections_active, 1);
        assert_eq!(snap.games_started, 1);
        assert_eq!(snap.games_completed, 0);
    }
}
