pub mod access;
pub mod document;
pub mod sla;
pub mod sprint;
pub mod ticket;
pub mod workload;
