//! Role-shaped dashboard summaries
//!
//! The same structures describe `GET /dashboard` responses and the summaries
//! the client derives locally from enrollment, progress and course lists.
//! Field names follow the backend's camelCase wire format. The `*_change`
//! percentages are only provided by the backend.

use serde::{Deserialize, Serialize};

/// Response of `GET /dashboard`; only the caller's role is populated
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentDashboard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherDashboard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminDashboard>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub enrolled_courses: usize,
    pub average_progress: f64,
    pub completed_courses: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_courses_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_progress_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_courses_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub created_courses: usize,
    pub student_engagement: f64,
    pub enrollments_in_courses: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_courses_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_engagement_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollments_in_courses_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_revenue: f64,
    pub total_enrollments: usize,
    pub active_courses: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_profit_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_enrollments_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_courses_change: Option<f64>,
}

/// Student table row: one per enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentEnrollmentRow {
    pub id: i64,
    pub course_title: String,
    pub progress: f64,
    pub enrolled_at: String,
}

/// Teacher table row: one per authored course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCourseRow {
    pub id: i64,
    pub course_title: String,
    pub enrollments: usize,
    pub average_progress: f64,
    pub created_at: String,
}

/// Admin table row: one per enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEnrollmentRow {
    pub id: i64,
    pub student_email: String,
    pub course_title: String,
    pub revenue: f64,
    pub enrolled_at: String,
}
