//! Clipforge - ephemeral video editing pipeline
//!
//! This library crate exposes configuration loading and component wiring for
//! the binary and for integration testing.

pub mod app;
pub mod config;
