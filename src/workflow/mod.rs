pub mod access;
pub mod assign;
pub mod comment;
pub mod fix;
pub mod sla;
pub mod subtasks;
