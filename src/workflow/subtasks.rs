use serde::Serialize;

use crate::context::AppContext;
use crate::domain::ticket::IssueKey;
use crate::error::{AppError, AppResult};

const SUBTASK_TYPE_NAME: &str = "Subtask";
const EPIC_TYPE_NAME: &str = "Epic";
const SUBTASK_TITLES: [&str; 3] = ["Implementation", "Unit Testing", "Documentation Update"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskOutcome {
    pub parent: IssueKey,
    pub created_subtasks: Vec<String>,
}

/// Breaks a ticket into the standard implementation, testing and docs subtasks.
/// Creation stops at the first failure; subtasks already created are kept.
pub async fn generate_subtasks(ctx: &AppContext, raw_key: &str) -> AppResult<SubtaskOutcome> {
    let key = IssueKey::parse(raw_key)?;
    tracing::info!(ticket = %key, "subtask generation started");

    let ticket = ctx.issue_tracker.fetch_ticket(&key).await?;
    let project = ticket.project.clone().ok_or_else(|| {
        AppError::IneligibleTicket(format!("{key} has no project field"))
    })?;
    ticket.ensure_open()?;

    if let Some(issue_type) = &ticket.issue_type {
        if issue_type.subtask {
            return Err(AppError::IneligibleTicket(format!(
                "{key} is already a subtask"
            )));
        }
        if issue_type.name == EPIC_TYPE_NAME {
            return Err(AppError::IneligibleTicket(format!(
                "{key} is an Epic; use child issues instead"
            )));
        }
    }

    let issue_types = ctx.issue_tracker.project_issue_types(&project.id).await?;
    let subtask_type = issue_types
        .iter()
        .find(|it| it.name == SUBTASK_TYPE_NAME && it.subtask)
        .ok_or_else(|| {
            let available: Vec<&str> = issue_types.iter().map(|it| it.name.as_str()).collect();
            AppError::IneligibleTicket(format!(
                "project {} has no '{SUBTASK_TYPE_NAME}' issue type (available: {})",
                project.key,
                available.join(", ")
            ))
        })?;
    tracing::debug!(project = %project.key, issue_type = %subtask_type.id, "resolved subtask type");

    let mut created = Vec::with_capacity(SUBTASK_TITLES.len());
    for title in SUBTASK_TITLES {
        let summary = format!("{title} - {key}");
        let subtask_key = ctx
            .issue_tracker
            .create_subtask(&project.id, &key, &summary, &subtask_type.id)
            .await
            .inspect_err(|err| {
                tracing::warn!(ticket = %key, created = ?created, error = %err, "subtask creation failed");
            })?;
        created.push(subtask_key);
    }

    tracing::info!(ticket = %key, created = ?created, "subtask generation finished");
    Ok(SubtaskOutcome {
        parent: key,
        created_subtasks: created,
    })
}
