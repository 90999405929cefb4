//! Issue Board Backend
//!
//! Layered architecture:
//! - domain: Core entities, ordering rules
//! - repository: SQLite data access
//! - routes: axum handlers exposing the REST API

pub mod domain;
pub mod repository;
pub mod routes;
pub mod config;

pub use routes::{router, AppState};
