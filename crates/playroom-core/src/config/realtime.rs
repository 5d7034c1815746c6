//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound event buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Interval between heartbeat liveness checks, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Connection is considered dead after this much inactivity, in seconds.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,
    /// Default game invitation time-to-live, in seconds.
    #[serde(default = "default_invite_ttl")]
    pub invite_ttl_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            invite_ttl_seconds: default_invite_ttl(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_heartbeat_timeout() -> u64 {
    60
}

fn default_invite_ttl() -> u64 {
    30
}
