//! # playroom-auth
//!
//! JWT issuance and validation for Playroom. The real-time layer only
//! validates tokens at WebSocket handshake time; issuance lives in the
//! (out-of-scope) login endpoint and in tests.

pub mod jwt;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
