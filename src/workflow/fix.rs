use serde::Serialize;

use crate::context::AppContext;
use crate::domain::document::Document;
use crate::domain::ticket::IssueKey;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize)]
pub struct FixOutcome {
    pub ticket: IssueKey,
    pub message: String,
}

/// Rewrites the ticket description into the standard war room layout.
pub async fn auto_fix(ctx: &AppContext, raw_key: &str) -> AppResult<FixOutcome> {
    let key = IssueKey::parse(raw_key)?;
    tracing::info!(ticket = %key, "auto-fix started");

    let ticket = ctx.issue_tracker.fetch_ticket(&key).await?;
    ticket.ensure_open()?;

    ctx.issue_tracker
        .update_description(&key, &Document::standard_structure())
        .await?;

    Ok(FixOutcome {
        message: format!("Ticket {key} improved with standardized structure."),
        ticket: key,
    })
}
