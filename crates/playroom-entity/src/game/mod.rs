//! Game invitation domain entities.

pub mod request;
pub mod status;

pub use request::GameRequest;
pub use status::GameRequestStatus;
