//! Library crate for chess-admin, exposing modules for binaries and integration tests.

/// Runtime settings loaded from disk.
pub mod config;
/// Data access: models and stores.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// Shared state, list paging and scheduling rules.
pub mod state;
