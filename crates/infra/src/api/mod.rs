//! Backend REST API client
//!
//! - [`client`]: request construction, error normalization, resource
//!   operations
//! - [`auth`]: login, registration and logout flows
//! - [`registry`]: in-flight request de-duplication

pub mod auth;
pub mod client;
pub mod registry;

pub use client::{Acknowledgement, ApiClient};
pub use registry::{ApiResponse, InFlightRegistry, PendingRequest, SharedOutcome};
