use serde::Serialize;

/// Load assigned to a candidate whose open-ticket count could not be read.
/// Large enough that any candidate with a known load is preferred.
pub const UNKNOWN_LOAD_SENTINEL: u32 = 999;

const HUMAN_ACCOUNT_TYPE: &str = "atlassian";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignableUser {
    pub account_id: String,
    pub display_name: String,
    pub account_type: Option<String>,
}

impl AssignableUser {
    pub fn is_human(&self) -> bool {
        self.account_type.as_deref() == Some(HUMAN_ACCOUNT_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub account_id: String,
    pub display_name: String,
    pub open_ticket_count: u32,
}

impl Candidate {
    pub fn new(user: &AssignableUser, open_ticket_count: u32) -> Self {
        Self {
            account_id: user.account_id.clone(),
            display_name: user.display_name.clone(),
            open_ticket_count,
        }
    }
}

/// Narrows the assignable users to the ones whose load will be checked.
pub fn shortlist(users: Vec<AssignableUser>, humans_only: bool, limit: usize) -> Vec<AssignableUser> {
    users
        .into_iter()
        .filter(|user| !humans_only || user.is_human())
        .take(limit)
        .collect()
}

/// Picks the candidate with the fewest open tickets; ties go to the earliest.
pub fn select_least_loaded(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(position, candidate)| (candidate.open_ticket_count, *position))
        .map(|(_, candidate)| candidate)
}
