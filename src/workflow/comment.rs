use serde::Serialize;

use crate::context::AppContext;
use crate::domain::ticket::IssueKey;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct CommentOutcome {
    pub ticket: IssueKey,
    pub posted: bool,
}

/// Posts a timeline note. Only input validation can fail; a rejected post is
/// logged and reported through `posted`.
pub async fn add_timeline_comment(
    ctx: &AppContext,
    raw_key: &str,
    text: &str,
) -> AppResult<CommentOutcome> {
    let key = IssueKey::parse(raw_key)?;
    if text.trim().is_empty() {
        return Err(AppError::Validation("comment text must not be empty".to_string()));
    }

    let posted = match ctx.issue_tracker.add_comment(&key, text.trim()).await {
        Ok(()) => {
            tracing::info!(ticket = %key, "timeline comment added");
            true
        }
        Err(err) => {
            tracing::warn!(ticket = %key, error = %err, "failed to add timeline comment");
            false
        }
    };

    Ok(CommentOutcome {
        ticket: key,
        posted,
    })
}
