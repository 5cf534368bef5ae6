//! # CourseHub Domain
//!
//! Business domain types and models for the CourseHub client.
//!
//! This crate contains:
//! - Backend record types (courses, enrollments, progress, users)
//! - The typed API error and the application error/Result definitions
//! - Configuration structures
//! - Storage keys and client defaults
//!
//! ## Architecture
//! - No dependencies on other CourseHub crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
