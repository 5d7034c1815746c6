//! # playroom-entity
//!
//! Domain entity models for Playroom. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod game;
pub mod message;
pub mod user;
