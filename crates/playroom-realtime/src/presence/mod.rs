//! Presence tracking and fan-out to friends.

pub mod broadcaster;

pub use broadcaster::PresenceBroadcaster;
