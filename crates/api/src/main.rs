//! CourseHub - command line client for the CourseHub education platform
//!
//! Output is JSON on stdout; logs go to stderr.

use std::io::Write;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use coursehub_domain::{Credentials, RecommendationQuery, RegisterRequest, Role};
use coursehub_lib::utils::command_helpers::CommandFailure;
use coursehub_lib::utils::logging::{init_tracing, json_logging_requested};
use coursehub_lib::{commands, AppContext};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "coursehub")]
#[command(about = "CourseHub education platform client", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the issued token
    Login(LoginArgs),
    /// Create an account
    Register(RegisterArgs),
    /// End the session and clear local credentials
    Logout,
    /// Show the stored current user
    Whoami,
    /// List the catalog or show one course
    Courses {
        /// Course id
        #[arg(long)]
        id: Option<i64>,
    },
    /// Enroll in a course
    Enroll {
        course_id: i64,
    },
    /// Ask for course recommendations
    Recommend(RecommendArgs),
    /// Show the dashboard for the current user's role
    Dashboard {
        /// Ask the backend instead of aggregating locally
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
    password: String,
    /// student, teacher or admin
    #[arg(long, default_value = "student")]
    role: String,
}

#[derive(Args)]
struct RecommendArgs {
    #[arg(long, default_value_t = coursehub_domain::constants::DEFAULT_RECOMMENDATION_COUNT)]
    top_n: u32,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env-backed arguments
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json || json_logging_requested());

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let ctx = AppContext::new().await.context("failed to initialize CourseHub client")?;
    info!(command = cli.command.name(), "starting");

    let outcome = run(&ctx, cli.command).await;
    match outcome {
        Ok(()) => Ok(()),
        Err(failure) => {
            print_json(&serde_json::json!({
                "error": failure.error.to_string(),
                "recovery": failure.recovery,
            }))?;
            warn!(error = %failure, "command failed");
            Err(failure.into())
        }
    }
}

async fn run(ctx: &AppContext, command: Commands) -> Result<(), CommandFailure> {
    match command {
        Commands::Login(args) => {
            let credentials = Credentials { email: args.email, password: args.password };
            emit(&commands::login(ctx, &credentials).await?)
        }
        Commands::Register(args) => {
            let request = RegisterRequest {
                username: args.username,
                email: args.email,
                password: args.password,
                role: Role::from(args.role),
            };
            emit(&commands::register(ctx, &request).await?)
        }
        Commands::Logout => {
            commands::logout(ctx).await?;
            emit(&serde_json::json!({ "logged_out": true }))
        }
        Commands::Whoami => emit(&commands::whoami(ctx).await?),
        Commands::Courses { id: Some(id) } => emit(&commands::get_course(ctx, id).await?),
        Commands::Courses { id: None } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });
            let courses = commands::list_courses(ctx, Some(&cancel)).await;
            watcher.abort();
            emit(&courses?)
        }
        Commands::Enroll { course_id } => emit(&commands::enroll(ctx, course_id).await?),
        Commands::Recommend(args) => {
            let query =
                RecommendationQuery { top_n: args.top_n, subject: args.subject, level: args.level };
            emit(&commands::recommend(ctx, &query).await?)
        }
        Commands::Dashboard { remote } => emit(&commands::dashboard(ctx, remote).await?),
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Register(_) => "register",
            Self::Logout => "logout",
            Self::Whoami => "whoami",
            Self::Courses { .. } => "courses",
            Self::Enroll { .. } => "enroll",
            Self::Recommend(_) => "recommend",
            Self::Dashboard { .. } => "dashboard",
        }
    }
}

fn emit<T: Serialize>(value: &T) -> Result<(), CommandFailure> {
    print_json(value).map_err(|err| CommandFailure {
        error: coursehub_domain::CourseHubError::Internal(format!("failed to write output: {err}")),
        recovery: None,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
