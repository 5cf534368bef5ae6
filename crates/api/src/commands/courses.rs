//! Catalog, enrollment and recommendation commands

use coursehub_domain::constants::{COURSES_RESOURCE, ENROLLMENTS_RESOURCE};
use coursehub_domain::{Course, Enrollment, EnrollmentRequest, Recommendation, RecommendationQuery};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::utils::command_helpers::{execute_command, CommandFailure};

/// List the catalog. Firing `cancel` aborts the fetch.
pub async fn list_courses(
    ctx: &AppContext,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Course>, CommandFailure> {
    execute_command(ctx, "courses::list", || async move {
        Ok(ctx.api.get_all::<Course>(COURSES_RESOURCE, cancel).await?)
    })
    .await
}

pub async fn get_course(ctx: &AppContext, id: i64) -> Result<Course, CommandFailure> {
    execute_command(ctx, "courses::get", || async move {
        Ok(ctx.api.get_by_id::<Course, _>(COURSES_RESOURCE, id).await?)
    })
    .await
}

/// Enroll the current user in a course.
pub async fn enroll(ctx: &AppContext, course_id: i64) -> Result<Enrollment, CommandFailure> {
    execute_command(ctx, "courses::enroll", || async move {
        let request = EnrollmentRequest { course_id };
        Ok(ctx.api.create::<_, Enrollment>(ENROLLMENTS_RESOURCE, &request).await?)
    })
    .await
}

pub async fn recommend(
    ctx: &AppContext,
    query: &RecommendationQuery,
) -> Result<Recommendation, CommandFailure> {
    execute_command(ctx, "courses::recommend", || async move {
        Ok(ctx.api.get_recommended(query).await?)
    })
    .await
}
