//! # playroom-directory
//!
//! The persistence boundary of Playroom. The real-time core consumes the
//! [`UserDirectory`] and [`MessageStore`] traits; this crate provides the
//! PostgreSQL implementations used in production and in-memory
//! implementations for tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use memory::{MemoryDirectory, MemoryMessageStore};
pub use repositories::message::PgMessageStore;
pub use repositories::user::PgDirectory;
pub use traits::{MessageStore, UserDirectory};
