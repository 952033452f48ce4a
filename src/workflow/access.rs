use crate::context::AppContext;
use crate::domain::access::AccessProfile;
use crate::error::AppResult;

/// Resolves the war room role of an account, defaulting to the caller.
pub async fn resolve_access(ctx: &AppContext, account_id: Option<String>) -> AppResult<AccessProfile> {
    let account_id = match account_id {
        Some(id) => id,
        None => ctx.issue_tracker.current_account_id().await?,
    };

    let groups = ctx.issue_tracker.user_groups(&account_id).await?;
    tracing::debug!(account = %account_id, groups = ?groups, "resolved user groups");
    Ok(AccessProfile::from_groups(account_id, &groups))
}
