//! Game invitation lifecycle.

pub mod coordinator;

pub use coordinator::{InvitationCoordinator, InviteOutcome};
