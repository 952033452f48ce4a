use futures::future::join_all;
use serde::Serialize;

use crate::context::AppContext;
use crate::domain::ticket::IssueKey;
use crate::domain::workload::{Candidate, UNKNOWN_LOAD_SENTINEL, select_least_loaded, shortlist};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AssignOptions {
    pub candidate_limit: usize,
    pub humans_only: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub ticket: IssueKey,
    pub account_id: String,
    pub assigned_to: String,
    pub open_tickets: u32,
    pub candidates: Vec<Candidate>,
    pub message: String,
}

/// Assigns the ticket to whichever shortlisted user carries the fewest open
/// tickets. Load lookups that fail count as [`UNKNOWN_LOAD_SENTINEL`].
///
/// Concurrent runs for the same ticket are not serialized; the last write wins.
pub async fn auto_assign(
    ctx: &AppContext,
    raw_key: &str,
    options: &AssignOptions,
) -> AppResult<AssignmentOutcome> {
    let key = IssueKey::parse(raw_key)?;
    tracing::info!(ticket = %key, "auto-assign started");

    let ticket = ctx.issue_tracker.fetch_ticket(&key).await?;
    ticket.ensure_open()?;

    let users = ctx.issue_tracker.assignable_users(&key).await?;
    let shortlisted = shortlist(users, options.humans_only, options.candidate_limit);
    if shortlisted.is_empty() {
        return Err(AppError::NoCandidates(key.to_string()));
    }

    // Results come back in shortlist order, which the tie-break relies on.
    let loads = join_all(shortlisted.iter().map(|user| async move {
        match ctx.issue_tracker.count_open_tickets(&user.account_id).await {
            Ok(count) => {
                tracing::debug!(account = %user.account_id, open = count, "candidate load");
                count
            }
            Err(err) => {
                tracing::warn!(
                    account = %user.account_id,
                    error = %err,
                    sentinel = UNKNOWN_LOAD_SENTINEL,
                    "load lookup failed, treating candidate as fully booked"
                );
                UNKNOWN_LOAD_SENTINEL
            }
        }
    }))
    .await;

    let candidates: Vec<Candidate> = shortlisted
        .iter()
        .zip(loads)
        .map(|(user, load)| Candidate::new(user, load))
        .collect();

    let chosen = select_least_loaded(&candidates)
        .cloned()
        .ok_or_else(|| AppError::NoCandidates(key.to_string()))?;

    ctx.issue_tracker
        .assign(&key, &chosen.account_id)
        .await
        .map_err(|err| AppError::AssignmentWrite(format!("{key} -> {}: {err}", chosen.display_name)))?;

    tracing::info!(
        ticket = %key,
        assignee = %chosen.display_name,
        open = chosen.open_ticket_count,
        "auto-assign finished"
    );

    Ok(AssignmentOutcome {
        message: format!(
            "Assigned to {}. They have the lowest active load ({} tickets).",
            chosen.display_name, chosen.open_ticket_count
        ),
        ticket: key,
        account_id: chosen.account_id,
        assigned_to: chosen.display_name,
        open_tickets: chosen.open_ticket_count,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::fake::{FakeTracker, open_ticket};

    fn options() -> AssignOptions {
        AssignOptions {
            candidate_limit: 5,
            humans_only: false,
        }
    }

    fn context(tracker: Arc<FakeTracker>) -> AppContext {
        AppContext::for_tests(tracker)
    }

    #[tokio::test]
    async fn assigns_least_loaded_candidate() {
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(open_ticket("KAN-1"))
                .with_user("a", "Alice", Some(5))
                .with_user("b", "Bob", Some(0))
                .with_user("c", "Charlie", Some(2)),
        );

        let outcome = auto_assign(&context(tracker.clone()), "KAN-1", &options())
            .await
            .unwrap();

        assert_eq!(outcome.assigned_to, "Bob");
        assert_eq!(outcome.open_tickets, 0);
        assert_eq!(
            outcome.message,
            "Assigned to Bob. They have the lowest active load (0 tickets)."
        );
        assert_eq!(tracker.assignments(), [("KAN-1".to_string(), "b".to_string())]);
    }

    #[tokio::test]
    async fn tied_loads_go_to_first_candidate() {
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(open_ticket("KAN-1"))
                .with_user("a", "Alice", Some(3))
                .with_user("b", "Bob", Some(3)),
        );

        let outcome = auto_assign(&context(tracker), "KAN-1", &options())
            .await
            .unwrap();
        assert_eq!(outcome.assigned_to, "Alice");
    }

    #[tokio::test]
    async fn failed_lookups_count_as_sentinel() {
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(open_ticket("KAN-1"))
                .with_user("a", "Alice", None)
                .with_user("b", "Bob", Some(12)),
        );

        let outcome = auto_assign(&context(tracker), "KAN-1", &options())
            .await
            .unwrap();

        assert_eq!(outcome.assigned_to, "Bob");
        assert_eq!(outcome.candidates[0].open_ticket_count, UNKNOWN_LOAD_SENTINEL);
    }

    #[tokio::test]
    async fn all_lookups_failing_still_assigns_first_candidate() {
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(open_ticket("KAN-1"))
                .with_user("a", "Alice", None)
                .with_user("b", "Bob", None),
        );

        let outcome = auto_assign(&context(tracker.clone()), "KAN-1", &options())
            .await
            .unwrap();

        assert_eq!(outcome.assigned_to, "Alice");
        assert_eq!(outcome.open_tickets, UNKNOWN_LOAD_SENTINEL);
        assert_eq!(tracker.assignments().len(), 1);
    }

    #[tokio::test]
    async fn no_candidates_fails_without_writing() {
        let tracker = Arc::new(FakeTracker::default().with_ticket(open_ticket("KAN-1")));

        let err = auto_assign(&context(tracker.clone()), "KAN-1", &options())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoCandidates(_)));
        assert!(tracker.assignments().is_empty());
    }

    #[tokio::test]
    async fn only_checks_load_for_shortlisted_candidates() {
        let mut tracker = FakeTracker::default().with_ticket(open_ticket("KAN-1"));
        for i in 0..8 {
            tracker = tracker.with_user(&format!("u{i}"), &format!("User {i}"), Some(10 - i));
        }
        let tracker = Arc::new(tracker);

        let limited = AssignOptions {
            candidate_limit: 3,
            humans_only: false,
        };
        let outcome = auto_assign(&context(tracker.clone()), "KAN-1", &limited)
            .await
            .unwrap();

        assert_eq!(outcome.assigned_to, "User 2");
        assert_eq!(tracker.load_queries.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn closed_tickets_are_rejected() {
        let mut ticket = open_ticket("KAN-1");
        ticket.status = Some("Done".to_string());
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(ticket)
                .with_user("a", "Alice", Some(0)),
        );

        let err = auto_assign(&context(tracker.clone()), "KAN-1", &options())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TerminalState { ref status, .. } if status == "Done"));
        assert!(tracker.assignments().is_empty());
    }

    #[tokio::test]
    async fn malformed_key_is_rejected_before_any_call() {
        let tracker = Arc::new(FakeTracker::default());
        let err = auto_assign(&context(tracker), "kan one", &options())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn write_failure_is_reported_as_assignment_error() {
        let tracker = Arc::new(FakeTracker {
            fail_assign: true,
            ..FakeTracker::default()
                .with_ticket(open_ticket("KAN-1"))
                .with_user("a", "Alice", Some(1))
        });

        let err = auto_assign(&context(tracker), "KAN-1", &options())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssignmentWrite(_)));
    }
}
