//! Command execution helpers
//!
//! Every command runs through [`execute_command`], which times it, logs the
//! outcome and applies the recovery policy to API failures.

use std::future::Future;
use std::time::Instant;

use coursehub_core::RecoveryAction;
use coursehub_domain::{CourseHubError, Result as DomainResult};
use tracing::{debug, info};

use crate::context::AppContext;
use crate::utils::logging::{error_label, log_command_execution};

/// Failed command together with what the caller should do about it
#[derive(Debug)]
pub struct CommandFailure {
    pub error: CourseHubError,
    /// Present for API failures
    pub recovery: Option<RecoveryAction>,
}

impl std::fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for CommandFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Execute a command with timing, logging and error recovery.
///
/// An authentication failure clears the stored session before returning.
pub async fn execute_command<F, Fut, T>(
    ctx: &AppContext,
    command_name: &str,
    command_fn: F,
) -> Result<T, CommandFailure>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    debug!(command = command_name, "executing command");

    let result = command_fn().await;

    let elapsed = start.elapsed();
    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, elapsed, result.is_ok(), error_type);

    match result {
        Ok(value) => Ok(value),
        Err(CourseHubError::Api(api)) => {
            let recovery = ctx.session.handle_error(&api).await;
            info!(command = command_name, ?recovery, "recovery action selected");
            Err(CommandFailure { error: CourseHubError::Api(api), recovery: Some(recovery) })
        }
        Err(error) => Err(CommandFailure { error, recovery: None }),
    }
}
