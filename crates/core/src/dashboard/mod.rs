//! Client-side dashboard aggregation
//!
//! Reduces already-fetched enrollment, progress and course lists into the
//! per-role summary cards and table rows. Used when the backend's
//! `/dashboard` summary is unavailable or a table view is needed.

use std::collections::{HashMap, HashSet};

use coursehub_domain::constants::{COMPLETED_PROGRESS, DEFAULT_REVENUE_PER_ENROLLMENT};
use coursehub_domain::{
    AdminDashboard, AdminEnrollmentRow, Course, Enrollment, LearningProgress, StudentDashboard,
    StudentEnrollmentRow, TeacherCourseRow, TeacherDashboard,
};
use serde::Serialize;

/// Student summary and one row per enrollment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentView {
    pub summary: StudentDashboard,
    pub rows: Vec<StudentEnrollmentRow>,
}

/// Teacher summary and one row per authored course
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherView {
    pub summary: TeacherDashboard,
    pub rows: Vec<TeacherCourseRow>,
}

/// Admin summary and one row per enrollment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminView {
    pub summary: AdminDashboard,
    pub rows: Vec<AdminEnrollmentRow>,
}

/// Aggregates fetched lists into dashboard views
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardAggregator {
    revenue_per_enrollment: f64,
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self { revenue_per_enrollment: DEFAULT_REVENUE_PER_ENROLLMENT }
    }
}

impl DashboardAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat revenue credited for each enrollment in the admin view
    #[must_use]
    pub fn with_revenue_per_enrollment(mut self, revenue: f64) -> Self {
        self.revenue_per_enrollment = revenue;
        self
    }

    pub fn student(&self, enrollments: &[Enrollment], progress: &[LearningProgress]) -> StudentView {
        let summary = StudentDashboard {
            enrolled_courses: enrollments.len(),
            average_progress: mean_progress(progress),
            completed_courses: progress.iter().filter(|p| is_completed(p.progress)).count(),
            ..StudentDashboard::default()
        };

        // first progress record per course wins
        let mut by_course: HashMap<i64, f64> = HashMap::new();
        for record in progress {
            by_course.entry(record.course.id).or_insert(record.progress);
        }

        let rows = enrollments
            .iter()
            .map(|e| StudentEnrollmentRow {
                id: e.id,
                course_title: e.course.title.clone(),
                progress: by_course.get(&e.course.id).copied().unwrap_or(0.0),
                enrolled_at: e.enrolled_at.clone(),
            })
            .collect();

        StudentView { summary, rows }
    }

    /// Teacher view over the courses authored by `teacher_id`.
    ///
    /// Engagement averages every progress record the caller can see; the
    /// enrollment count only covers the teacher's own courses.
    pub fn teacher(
        &self,
        teacher_id: i64,
        courses: &[Course],
        enrollments: &[Enrollment],
        progress: &[LearningProgress],
    ) -> TeacherView {
        let own: Vec<&Course> =
            courses.iter().filter(|c| c.author_id() == Some(teacher_id)).collect();
        let own_ids: HashSet<i64> = own.iter().map(|c| c.id).collect();

        let summary = TeacherDashboard {
            created_courses: own.len(),
            student_engagement: mean_progress(progress),
            enrollments_in_courses: enrollments
                .iter()
                .filter(|e| own_ids.contains(&e.course.id))
                .count(),
            ..TeacherDashboard::default()
        };

        let rows = own
            .into_iter()
            .map(|course| {
                let course_progress: Vec<f64> = progress
                    .iter()
                    .filter(|p| p.course.id == course.id)
                    .map(|p| p.progress)
                    .collect();
                TeacherCourseRow {
                    id: course.id,
                    course_title: course.title.clone(),
                    enrollments: enrollments.iter().filter(|e| e.course.id == course.id).count(),
                    average_progress: mean(&course_progress),
                    created_at: course.created_at.clone(),
                }
            })
            .collect();

        TeacherView { summary, rows }
    }

    pub fn admin(&self, enrollments: &[Enrollment], courses: &[Course]) -> AdminView {
        let summary = AdminDashboard {
            total_revenue: self.revenue_per_enrollment * enrollments.len() as f64,
            total_enrollments: enrollments.len(),
            active_courses: courses.len(),
            ..AdminDashboard::default()
        };

        let rows = enrollments
            .iter()
            .map(|e| AdminEnrollmentRow {
                id: e.id,
                student_email: e.user.email.clone(),
                course_title: e.course.title.clone(),
                revenue: self.revenue_per_enrollment,
                enrolled_at: e.enrolled_at.clone(),
            })
            .collect();

        AdminView { summary, rows }
    }
}

fn is_completed(progress: f64) -> bool {
    (progress - COMPLETED_PROGRESS).abs() < f64::EPSILON
}

fn mean_progress(progress: &[LearningProgress]) -> f64 {
    let values: Vec<f64> = progress.iter().map(|p| p.progress).collect();
    mean(&values)
}

/// Mean rounded to two decimals; 0 for an empty slice
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    round2(avg)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
