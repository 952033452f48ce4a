use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::document::Document;
use crate::domain::ticket::{IssueKey, IssueTypeInfo, ProjectRef, Ticket};
use crate::domain::workload::AssignableUser;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

/// In-memory tracker that records every write it receives.
#[derive(Default)]
pub struct FakeTracker {
    pub tickets: HashMap<String, Ticket>,
    pub users: Vec<AssignableUser>,
    pub loads: HashMap<String, u32>,
    pub issue_types: Vec<IssueTypeInfo>,
    pub fail_assign: bool,
    pub fail_subtask_at: Option<usize>,
    pub fail_comment: bool,
    pub account_id: String,
    pub groups: Vec<String>,
    pub assignments: Mutex<Vec<(String, String)>>,
    pub descriptions: Mutex<Vec<(String, Document)>>,
    pub subtasks: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(String, String)>>,
    pub load_queries: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn with_ticket(mut self, ticket: Ticket) -> Self {
        self.tickets.insert(ticket.key.to_string(), ticket);
        self
    }

    pub fn with_user(mut self, id: &str, name: &str, load: Option<u32>) -> Self {
        self.users.push(AssignableUser {
            account_id: id.to_string(),
            display_name: name.to_string(),
            account_type: Some("atlassian".to_string()),
        });
        if let Some(load) = load {
            self.loads.insert(id.to_string(), load);
        }
        self
    }

    pub fn assignments(&self) -> Vec<(String, String)> {
        self.assignments.lock().unwrap().clone()
    }
}

pub fn open_ticket(key: &str) -> Ticket {
    Ticket {
        key: IssueKey::parse(key).unwrap(),
        status: Some("To Do".to_string()),
        priority: Some("Medium".to_string()),
        created: Some("2024-01-15T10:30:00.000+0000".to_string()),
        project: Some(ProjectRef {
            id: "10000".to_string(),
            key: key.split('-').next().unwrap().to_string(),
        }),
        issue_type: Some(IssueTypeInfo {
            id: "10001".to_string(),
            name: "Task".to_string(),
            subtask: false,
        }),
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn fetch_ticket(&self, key: &IssueKey) -> AppResult<Ticket> {
        self.tickets
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| AppError::TicketNotFound(key.to_string()))
    }

    async fn assignable_users(&self, _key: &IssueKey) -> AppResult<Vec<AssignableUser>> {
        Ok(self.users.clone())
    }

    async fn count_open_tickets(&self, account_id: &str) -> AppResult<u32> {
        self.load_queries.lock().unwrap().push(account_id.to_string());
        self.loads
            .get(account_id)
            .copied()
            .ok_or_else(|| AppError::TransientQuery(format!("search failed for {account_id}")))
    }

    async fn assign(&self, key: &IssueKey, account_id: &str) -> AppResult<()> {
        if self.fail_assign {
            return Err(AppError::IssueTracker("Jira responded with 403".to_string()));
        }
        self.assignments
            .lock()
            .unwrap()
            .push((key.to_string(), account_id.to_string()));
        Ok(())
    }

    async fn update_description(&self, key: &IssueKey, document: &Document) -> AppResult<()> {
        self.descriptions
            .lock()
            .unwrap()
            .push((key.to_string(), document.clone()));
        Ok(())
    }

    async fn project_issue_types(&self, _project_id: &str) -> AppResult<Vec<IssueTypeInfo>> {
        Ok(self.issue_types.clone())
    }

    async fn create_subtask(
        &self,
        _project_id: &str,
        parent: &IssueKey,
        summary: &str,
        _issue_type_id: &str,
    ) -> AppResult<String> {
        let mut created = self.subtasks.lock().unwrap();
        if self.fail_subtask_at == Some(created.len()) {
            return Err(AppError::IssueTracker(format!(
                "Jira responded with 400: cannot create \"{summary}\""
            )));
        }
        let project = parent.as_str().split('-').next().unwrap_or("KAN");
        let key = format!("{project}-{}", 100 + created.len());
        created.push(summary.to_string());
        Ok(key)
    }

    async fn add_comment(&self, key: &IssueKey, text: &str) -> AppResult<()> {
        if self.fail_comment {
            return Err(AppError::IssueTracker("Jira responded with 500".to_string()));
        }
        self.comments
            .lock()
            .unwrap()
            .push((key.to_string(), text.to_string()));
        Ok(())
    }

    async fn current_account_id(&self) -> AppResult<String> {
        Ok(self.account_id.clone())
    }

    async fn user_groups(&self, _account_id: &str) -> AppResult<Vec<String>> {
        Ok(self.groups.clone())
    }
}
