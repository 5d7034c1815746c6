//! # playroom-api
//!
//! HTTP layer for Playroom built on Axum.
//!
//! Provides the WebSocket upgrade into the realtime engine, health
//! endpoints, CORS, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
