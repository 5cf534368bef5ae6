//! Command implementations exposed to the CLI
//!
//! Each command takes the shared [`AppContext`](crate::context::AppContext)
//! and runs through
//! [`execute_command`](crate::utils::command_helpers::execute_command) so
//! timing, logging and error recovery are uniform.

pub mod auth;
pub mod courses;
pub mod dashboard;

pub use auth::{login, logout, register, whoami, LoginSummary};
pub use courses::{enroll, get_course, list_courses, recommend};
pub use dashboard::{dashboard, DashboardReport};
