mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod telemetry;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cmd::agent::{self, AccessArgs, AssignArgs, CommentArgs, SprintArgs, TicketArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(name = "warroom", author, version, about = "Incident war room agents for Jira")]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a ticket to the least loaded assignable user.
    Assign(AssignArgs),
    /// Estimate how close a ticket is to breaching its SLA.
    Sla(TicketArgs),
    /// Rewrite a ticket description into the standard structure.
    Fix(TicketArgs),
    /// Create implementation, testing and documentation subtasks.
    Subtasks(TicketArgs),
    /// Predict sprint slippage from velocity and remaining points.
    Sprint(SprintArgs),
    /// Show the war room role and permissions of a Jira account.
    Access(AccessArgs),
    /// Add a timeline comment to a ticket.
    Comment(CommentArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Sprint(args) => agent::sprint(args, json),
        Commands::Assign(args) => agent::assign(&build_context()?, args, json).await,
        Commands::Sla(args) => agent::sla(&build_context()?, args, json).await,
        Commands::Fix(args) => agent::fix(&build_context()?, args, json).await,
        Commands::Subtasks(args) => agent::subtasks(&build_context()?, args, json).await,
        Commands::Access(args) => agent::access(&build_context()?, args, json).await,
        Commands::Comment(args) => agent::comment(&build_context()?, args, json).await,
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;

    if config.jira_base_url.is_none() {
        tracing::warn!("Jira base URL not configured; run `warroom config init`");
    }
    if config.jira_email.is_none() {
        tracing::warn!("Jira email not configured; Jira calls will fail");
    }
    if config.jira_token.is_none() {
        tracing::warn!("Jira token not configured; Jira calls will fail");
    }

    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_base_url.clone(),
        config.jira_email.clone(),
        config.jira_token.clone(),
        config.retry.clone(),
    )?);

    Ok(AppContext::new(config, issue_tracker))
}
