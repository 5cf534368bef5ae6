//! Domain types and models
//!
//! Records exchanged with the CourseHub REST backend. Unknown fields are
//! ignored so the client keeps working when the backend adds columns.

pub mod auth;
pub mod course;
pub mod dashboard;
pub mod user;

pub use auth::{Credentials, LoginResponse, RegisterRequest};
pub use course::{
    Course, CourseDraft, CourseUpdate, Enrollment, EnrollmentRequest, LearningProgress,
    Recommendation, RecommendationQuery, UploadFile,
};
pub use dashboard::{
    AdminDashboard, AdminEnrollmentRow, DashboardResponse, StudentDashboard, StudentEnrollmentRow,
    TeacherCourseRow, TeacherDashboard,
};
pub use user::{AccountStatus, CurrentUser, Profile, Role, UserProfile};
