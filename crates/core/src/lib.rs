//! # CourseHub Core
//!
//! Pure client-side logic - no HTTP or filesystem code.
//!
//! This crate contains:
//! - The session (credential + current user) and its storage ports
//! - Caller recovery policy for typed API errors
//! - Dashboard aggregation over fetched enrollment/progress/course lists
//!
//! ## Architecture Principles
//! - Only depends on `coursehub-domain`
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod dashboard;
pub mod recovery;
pub mod session;

pub use dashboard::{AdminView, DashboardAggregator, StudentView, TeacherView};
pub use recovery::RecoveryAction;
pub use session::ports::{CredentialStore, CurrentUserStore};
pub use session::Session;
