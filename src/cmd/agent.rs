use chrono::Utc;
use clap::Args;

use crate::cmd::emit;
use crate::context::AppContext;
use crate::domain::sprint::predict as predict_sprint;
use crate::error::AppResult;
use crate::workflow::access::resolve_access;
use crate::workflow::assign::{AssignOptions, auto_assign};
use crate::workflow::comment::add_timeline_comment;
use crate::workflow::fix::auto_fix;
use crate::workflow::sla::predict_sla_risk;
use crate::workflow::subtasks::generate_subtasks;

#[derive(Args, Debug, Clone)]
pub struct AssignArgs {
    /// Ticket key, e.g. KAN-123.
    pub key: String,
    /// How many assignable users to compare (defaults to the configured limit).
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Skip bot and app accounts.
    #[arg(long)]
    pub humans_only: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TicketArgs {
    /// Ticket key, e.g. KAN-123.
    pub key: String,
}

#[derive(Args, Debug, Clone)]
pub struct SprintArgs {
    /// Story points completed per sprint.
    #[arg(long, default_value_t = 25)]
    pub velocity: u32,
    /// Story points still open.
    #[arg(long, default_value_t = 32)]
    pub remaining: u32,
    /// Working days left in the sprint.
    #[arg(long, default_value_t = 2)]
    pub days_left: u32,
}

#[derive(Args, Debug, Clone)]
pub struct AccessArgs {
    /// Account to inspect; defaults to the configured Jira user.
    #[arg(long)]
    pub account_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CommentArgs {
    /// Ticket key, e.g. KAN-123.
    pub key: String,
    /// Comment text; blank lines separate paragraphs.
    pub text: String,
}

pub async fn assign(ctx: &AppContext, args: AssignArgs, json: bool) -> AppResult<()> {
    let options = AssignOptions {
        candidate_limit: args.limit.unwrap_or(ctx.config.candidate_limit).max(1),
        humans_only: args.humans_only || ctx.config.humans_only,
    };
    let outcome = auto_assign(ctx, &args.key, &options).await?;
    emit(json, &outcome, |o| format!("{}: {}", o.ticket, o.message))
}

pub async fn sla(ctx: &AppContext, args: TicketArgs, json: bool) -> AppResult<()> {
    let report = predict_sla_risk(ctx, &args.key, Utc::now()).await?;
    emit(json, &report, |r| {
        format!(
            "{} ({}): {} risk, {}h of {}h elapsed, breach probability {}",
            r.issue_key,
            r.priority,
            r.assessment.risk_level.as_str(),
            r.assessment.age_hours,
            r.assessment.sla_limit_hours,
            r.assessment.breach_probability
        )
    })
}

pub async fn fix(ctx: &AppContext, args: TicketArgs, json: bool) -> AppResult<()> {
    let outcome = auto_fix(ctx, &args.key).await?;
    emit(json, &outcome, |o| o.message.clone())
}

pub async fn subtasks(ctx: &AppContext, args: TicketArgs, json: bool) -> AppResult<()> {
    let outcome = generate_subtasks(ctx, &args.key).await?;
    emit(json, &outcome, |o| {
        format!("Created subtasks for {}: {}", o.parent, o.created_subtasks.join(", "))
    })
}

pub async fn access(ctx: &AppContext, args: AccessArgs, json: bool) -> AppResult<()> {
    let profile = resolve_access(ctx, args.account_id).await?;
    emit(json, &profile, |p| {
        let permissions: Vec<&str> = p.permissions.iter().map(|perm| perm.as_str()).collect();
        format!(
            "{}: {} [{}]",
            p.account_id,
            p.role_label.unwrap_or("No war room role"),
            permissions.join(", ")
        )
    })
}

pub async fn comment(ctx: &AppContext, args: CommentArgs, json: bool) -> AppResult<()> {
    let outcome = add_timeline_comment(ctx, &args.key, &args.text).await?;
    emit(json, &outcome, |o| {
        if o.posted {
            format!("Comment added to {}.", o.ticket)
        } else {
            format!("Could not add comment to {}; see log for details.", o.ticket)
        }
    })
}

pub fn sprint(args: SprintArgs, json: bool) -> AppResult<()> {
    let report = predict_sprint(args.velocity, args.remaining, args.days_left)?;
    emit(json, &report, |r| {
        format!("Sprint Risk: {}. {}", r.risk_level.as_str(), r.recommendation)
    })
}
