//! Application constants
//!
//! Centralized location for storage keys, endpoint paths and client
//! defaults used throughout the application.

// Persisted storage keys
pub const TOKEN_STORAGE_KEY: &str = "token";
pub const USER_STORAGE_KEY: &str = "user-storage";

// Retry defaults (transport failures only)
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Fixed endpoints
pub const LOGIN_PATH: &str = "token/pair";
pub const REGISTER_PATH: &str = "auth/register";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const DASHBOARD_PATH: &str = "dashboard";
pub const RECOMMEND_PATH: &str = "recommend";
pub const USERS_RESOURCE: &str = "users";
pub const COURSES_RESOURCE: &str = "courses";
pub const ENROLLMENTS_RESOURCE: &str = "enrollments";
pub const PROGRESS_RESOURCE: &str = "progress";
pub const UPLOAD_IMAGE_SEGMENT: &str = "upload-image";
pub const DEFAULT_UPLOAD_FIELD: &str = "image";

// Recommendations
pub const DEFAULT_RECOMMENDATION_COUNT: u32 = 3;

// Client-side dashboard aggregation
pub const DEFAULT_REVENUE_PER_ENROLLMENT: f64 = 10.0;
pub const COMPLETED_PROGRESS: f64 = 100.0;

// Where callers send the user after an authentication failure
pub const LOGIN_ROUTE: &str = "/login";
