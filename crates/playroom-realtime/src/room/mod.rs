//! Room membership tracking for game sessions.

pub mod registry;

pub use registry::RoomRegistry;
