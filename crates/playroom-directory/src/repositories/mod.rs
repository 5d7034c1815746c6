//! PostgreSQL repository implementations of the boundary traits.

pub mod message;
pub mod user;
