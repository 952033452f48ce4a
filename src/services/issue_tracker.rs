use async_trait::async_trait;

use crate::domain::document::Document;
use crate::domain::ticket::{IssueKey, IssueTypeInfo, Ticket};
use crate::domain::workload::AssignableUser;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn fetch_ticket(&self, key: &IssueKey) -> AppResult<Ticket>;
    async fn assignable_users(&self, key: &IssueKey) -> AppResult<Vec<AssignableUser>>;
    /// Tickets assigned to the account whose status category is not Done.
    async fn count_open_tickets(&self, account_id: &str) -> AppResult<u32>;
    async fn assign(&self, key: &IssueKey, account_id: &str) -> AppResult<()>;
    async fn update_description(&self, key: &IssueKey, document: &Document) -> AppResult<()>;
    async fn project_issue_types(&self, project_id: &str) -> AppResult<Vec<IssueTypeInfo>>;
    async fn create_subtask(
        &self,
        project_id: &str,
        parent: &IssueKey,
        summary: &str,
        issue_type_id: &str,
    ) -> AppResult<String>;
    async fn add_comment(&self, key: &IssueKey, text: &str) -> AppResult<()>;
    async fn current_account_id(&self) -> AppResult<String>;
    async fn user_groups(&self, account_id: &str) -> AppResult<Vec<String>>;
}
