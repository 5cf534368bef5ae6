//! # CourseHub Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP transport with transport-failure retry
//! - The REST API client (auth, CRUD, uploads, dashboard, recommendations)
//! - File and in-memory storage for the session
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `coursehub-core`
//! - Contains all "impure" code (network, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{ApiClient, InFlightRegistry};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use storage::{LocalStorage, MemoryStorage};
