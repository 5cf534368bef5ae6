//! Authentication commands

use coursehub_domain::{Credentials, CurrentUser, RegisterRequest};
use coursehub_infra::api::Acknowledgement;
use serde::Serialize;
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::{execute_command, CommandFailure};

/// What a successful login reports back; the token itself stays in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSummary {
    pub user: CurrentUser,
    pub has_refresh_token: bool,
}

/// Exchange credentials for a token and record the current user.
pub async fn login(
    ctx: &AppContext,
    credentials: &Credentials,
) -> Result<LoginSummary, CommandFailure> {
    execute_command(ctx, "auth::login", || async move {
        let response = ctx.api.login(credentials).await?;
        let user = ctx.session.current_user().unwrap_or_else(CurrentUser::fallback_student);
        info!(role = %user.role, "logged in");
        Ok(LoginSummary { user, has_refresh_token: response.refresh.is_some() })
    })
    .await
}

pub async fn register(
    ctx: &AppContext,
    request: &RegisterRequest,
) -> Result<Acknowledgement, CommandFailure> {
    execute_command(ctx, "auth::register", || async move {
        Ok(ctx.api.register::<Acknowledgement>(request).await?)
    })
    .await
}

/// End the session. Local state is cleared even when the server is
/// unreachable.
pub async fn logout(ctx: &AppContext) -> Result<(), CommandFailure> {
    execute_command(ctx, "auth::logout", || async move {
        ctx.api.logout().await?;
        Ok(())
    })
    .await
}

/// The persisted current user, if any. Does not touch the network.
pub async fn whoami(ctx: &AppContext) -> Result<Option<CurrentUser>, CommandFailure> {
    execute_command(ctx, "auth::whoami", || async move { Ok(ctx.session.current_user()) })
        .await
}
