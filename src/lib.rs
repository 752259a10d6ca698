#![deny(missing_docs)]

//! Core library for the in-memory user registry server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Registry activity counters.
pub mod metrics;
/// In-memory user collection.
pub mod store;
