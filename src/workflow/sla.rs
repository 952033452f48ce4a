use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::AppContext;
use crate::domain::sla::{FALLBACK_PRIORITY, SlaAssessment, classify};
use crate::domain::ticket::IssueKey;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaReport {
    pub issue_key: IssueKey,
    pub priority: String,
    #[serde(flatten)]
    pub assessment: SlaAssessment,
}

pub async fn predict_sla_risk(
    ctx: &AppContext,
    raw_key: &str,
    now: DateTime<Utc>,
) -> AppResult<SlaReport> {
    let key = IssueKey::parse(raw_key)?;
    tracing::info!(ticket = %key, "SLA prediction started");

    let ticket = ctx.issue_tracker.fetch_ticket(&key).await?;
    let created_at = ticket.created_at()?;
    let assessment = classify(now, created_at, ticket.priority.as_deref());

    tracing::info!(
        ticket = %key,
        risk = assessment.risk_level.as_str(),
        age_hours = assessment.age_hours,
        "SLA prediction finished"
    );

    Ok(SlaReport {
        issue_key: key,
        priority: ticket
            .priority
            .unwrap_or_else(|| FALLBACK_PRIORITY.as_str().to_string()),
        assessment,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::sla::RiskLevel;
    use crate::error::AppError;
    use crate::services::fake::{FakeTracker, open_ticket};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 16, 20, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn reports_risk_for_fetched_ticket() {
        let mut ticket = open_ticket("OPS-9");
        ticket.priority = Some("High".to_string());
        let ctx = AppContext::for_tests(Arc::new(FakeTracker::default().with_ticket(ticket)));

        let report = predict_sla_risk(&ctx, "OPS-9", now()).await.unwrap();

        assert_eq!(report.priority, "High");
        assert_eq!(report.assessment.age_hours, 34.0);
        assert_eq!(report.assessment.sla_limit_hours, 24);
        assert_eq!(report.assessment.risk_level, RiskLevel::Breached);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["issueKey"], "OPS-9");
        assert_eq!(json["riskLevel"], "BREACHED");
    }

    #[tokio::test]
    async fn missing_priority_reports_medium() {
        let mut ticket = open_ticket("OPS-9");
        ticket.priority = None;
        let ctx = AppContext::for_tests(Arc::new(FakeTracker::default().with_ticket(ticket)));

        let report = predict_sla_risk(&ctx, "OPS-9", now()).await.unwrap();
        assert_eq!(report.priority, "Medium");
        assert_eq!(report.assessment.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn invalid_timestamp_fails_fast() {
        let mut ticket = open_ticket("OPS-9");
        ticket.created = Some("last tuesday".to_string());
        let ctx = AppContext::for_tests(Arc::new(FakeTracker::default().with_ticket(ticket)));

        let err = predict_sla_risk(&ctx, "OPS-9", now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let ctx = AppContext::for_tests(Arc::new(FakeTracker::default()));
        let err = predict_sla_risk(&ctx, "OPS-1", now()).await.unwrap_err();
        assert!(matches!(err, AppError::TicketNotFound(_)));
    }
}
