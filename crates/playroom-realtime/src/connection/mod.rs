//! WebSocket connection management — handles, registry, heartbeat, auth.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod registry;

pub use handle::ConnectionHandle;
pub use registry::ConnectionRegistry;
