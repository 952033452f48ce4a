use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{AppError, AppResult};

const TERMINAL_STATUSES: [&str; 2] = ["Done", "Closed"];

/// A Jira issue key such as `KAN-123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let candidate = raw.trim();
        if key_pattern().is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(AppError::Validation(format!(
                "invalid issue key format: \"{candidate}\"; expected something like \"KAN-123\""
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").expect("issue key pattern"))
}

#[derive(Debug, Clone)]
pub struct ProjectRef {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct IssueTypeInfo {
    pub id: String,
    pub name: String,
    pub subtask: bool,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub key: IssueKey,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub created: Option<String>,
    pub project: Option<ProjectRef>,
    pub issue_type: Option<IssueTypeInfo>,
}

impl Ticket {
    /// Returns the status name when the ticket can no longer be worked on.
    pub fn terminal_status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .filter(|status| TERMINAL_STATUSES.contains(status))
    }

    pub fn ensure_open(&self) -> AppResult<()> {
        match self.terminal_status() {
            Some(status) => Err(AppError::TerminalState {
                key: self.key.to_string(),
                status: status.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn created_at(&self) -> AppResult<DateTime<Utc>> {
        let raw = self.created.as_deref().ok_or_else(|| {
            AppError::Validation(format!("ticket {} has no creation timestamp", self.key))
        })?;
        parse_timestamp(raw)
    }
}

/// Accepts both RFC 3339 and Jira's `2024-01-15T10:30:00.000+0000` form.
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| AppError::Validation(format!("invalid timestamp \"{trimmed}\": {err}")))
}
