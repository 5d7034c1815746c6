//! Inactivity heartbeat for WebSocket keepalive.
//!
//! Clients probe with `ping` events; the server answers `pong` and records
//! the activity. This loop only watches the last-activity timestamp and
//! marks connections dead when the client goes silent past the timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use super::handle::ConnectionHandle;

/// Heartbeat configuration.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between inactivity checks.
    pub check_interval: Duration,
    /// Silence threshold before considering the connection dead.
    pub idle_timeout: Duration,
}

/// Run the inactivity watchdog for a connection.
///
/// Returns once the connection is marked dead, either by this loop or by a
/// failed send elsewhere.
pub async fn run_watchdog(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.check_interval);
    // The first tick fires immediately; skip it so a fresh connection is
    // not checked before the client had a chance to speak.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let last_activity = handle.last_activity().await;
        let elapsed = Utc::now() - last_activity;

        if let Ok(elapsed_std) = elapsed.to_std() {
            if elapsed_std > config.idle_timeout {
                tracing::warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    idle_secs = elapsed_std.as_secs(),
                    "Connection idle past heartbeat timeout, marking dead"
                );
                handle.mark_dead();
                break;
            }
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat watchdog ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_marks_idle_connection_dead() {
        let (tx, _rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(Uuid::new_v4(), tx));

        let config = HeartbeatConfig {
            check_interval: Duration::from_millis(10),
            idle_timeout: Duration::from_millis(0),
        };

        run_watchdog(handle.clone(), config).await;
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_watchdog_exits_when_marked_dead() {
        let (tx, _rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(Uuid::new_v4(), tx));
        handle.mark_dead();

        let config = HeartbeatConfig {
            check_interval: Duration::from_millis(1),
            idle_timeout: Duration::from_secs(60),
        };

        run_watchdog(handle, config).await;
    }
}
