pub mod jira;
pub mod retry;
