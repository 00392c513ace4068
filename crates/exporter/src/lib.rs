//! envgauge exporter library.
//!
//! Exposes the configuration, gauge registry, pollers and HTTP router so
//! integration tests and the binary entrypoint share the same building
//! blocks.

pub mod config;
pub mod error;
pub mod poller;
pub mod registry;
pub mod router;
pub mod routes;
pub mod state;
