//! Wire-level event definitions.

pub mod types;

pub use types::{ClientEvent, ServerEvent};
