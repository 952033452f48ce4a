use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("ticket {key} is already {status}; no action taken")]
    TerminalState { key: String, status: String },
    #[error("no assignable users found for {0}")]
    NoCandidates(String),
    #[error("tracker query failed: {0}")]
    TransientQuery(String),
    #[error("assignment failed: {0}")]
    AssignmentWrite(String),
    #[error("ticket {0} not found")]
    TicketNotFound(String),
    #[error("ticket not eligible: {0}")]
    IneligibleTicket(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
