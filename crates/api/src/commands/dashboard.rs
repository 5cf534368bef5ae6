//! Role-aware dashboard command
//!
//! By default the summary is computed locally from the enrollment, progress
//! and course lists; `remote` asks the backend's `/dashboard` instead.

use coursehub_core::{AdminView, StudentView, TeacherView};
use coursehub_domain::constants::{
    COURSES_RESOURCE, ENROLLMENTS_RESOURCE, PROGRESS_RESOURCE, USERS_RESOURCE,
};
use coursehub_domain::{
    Course, CourseHubError, CurrentUser, DashboardResponse, Enrollment, LearningProgress, Role,
    Result as DomainResult,
};
use serde::Serialize;
use tracing::debug;

use crate::context::AppContext;
use crate::utils::command_helpers::{execute_command, CommandFailure};

/// Dashboard output, tagged by the role it was computed for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardReport {
    Student(StudentView),
    Teacher(TeacherView),
    Admin(AdminView),
    Remote(DashboardResponse),
}

pub async fn dashboard(ctx: &AppContext, remote: bool) -> Result<DashboardReport, CommandFailure> {
    execute_command(ctx, "dashboard::get", || async move {
        if remote {
            return Ok(DashboardReport::Remote(ctx.api.get_dashboard().await?));
        }
        local_dashboard(ctx).await
    })
    .await
}

async fn local_dashboard(ctx: &AppContext) -> DomainResult<DashboardReport> {
    let user = ctx.session.current_user().ok_or_else(|| {
        CourseHubError::InvalidInput("no current user; log in first".to_string())
    })?;
    debug!(role = %user.role, "aggregating dashboard locally");

    match user.role {
        Role::Student => {
            let (enrollments, progress) = tokio::try_join!(
                ctx.api.get_all::<Enrollment>(ENROLLMENTS_RESOURCE, None),
                ctx.api.get_all::<LearningProgress>(PROGRESS_RESOURCE, None),
            )?;
            Ok(DashboardReport::Student(ctx.dashboard.student(&enrollments, &progress)))
        }
        Role::Teacher => {
            let teacher_id = resolve_user_id(ctx, &user).await?;
            let (courses, enrollments, progress) = tokio::try_join!(
                ctx.api.get_all::<Course>(COURSES_RESOURCE, None),
                ctx.api.get_all::<Enrollment>(ENROLLMENTS_RESOURCE, None),
                ctx.api.get_all::<LearningProgress>(PROGRESS_RESOURCE, None),
            )?;
            Ok(DashboardReport::Teacher(ctx.dashboard.teacher(
                teacher_id,
                &courses,
                &enrollments,
                &progress,
            )))
        }
        Role::Admin => {
            let (enrollments, courses) = tokio::try_join!(
                ctx.api.get_all::<Enrollment>(ENROLLMENTS_RESOURCE, None),
                ctx.api.get_all::<Course>(COURSES_RESOURCE, None),
            )?;
            Ok(DashboardReport::Admin(ctx.dashboard.admin(&enrollments, &courses)))
        }
        Role::Guest => {
            Err(CourseHubError::InvalidInput("guests have no dashboard".to_string()))
        }
    }
}

/// Stored id, else ask `/users/me` and remember the answer.
async fn resolve_user_id(ctx: &AppContext, user: &CurrentUser) -> DomainResult<i64> {
    if let Some(id) = user.id {
        return Ok(id);
    }

    let fetched: CurrentUser = ctx.api.get_me(USERS_RESOURCE).await?;
    let id = fetched
        .id
        .ok_or_else(|| CourseHubError::Internal("current user has no id".to_string()))?;
    ctx.session.set_current_user(fetched).await?;
    Ok(id)
}
