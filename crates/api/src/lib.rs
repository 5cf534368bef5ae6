//! # CourseHub App
//!
//! Application layer - commands and the CLI entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Command functions used by the `coursehub` binary
//! - Logging setup and command execution helpers
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires storage, session and API client together

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
