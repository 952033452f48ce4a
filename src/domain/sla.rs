use chrono::{DateTime, Utc};
use serde::Serialize;

/// Priority used when a ticket carries a label outside the budget table.
pub const FALLBACK_PRIORITY: Priority = Priority::Medium;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "highest" => Some(Priority::Highest),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            "lowest" => Some(Priority::Lowest),
            _ => None,
        }
    }

    /// Hours a ticket of this priority may stay open before it breaches.
    pub fn budget_hours(&self) -> u32 {
        match self {
            Priority::Highest => 4,
            Priority::High => 24,
            Priority::Medium => 48,
            Priority::Low => 72,
            Priority::Lowest => 120,
        }
    }

    /// Resolves a raw label against the budget table. Missing labels and labels
    /// outside the table both land on [`FALLBACK_PRIORITY`].
    pub fn resolve(label: Option<&str>) -> Self {
        match label {
            None => FALLBACK_PRIORITY,
            Some(raw) => Self::from_label(raw).unwrap_or_else(|| {
                tracing::debug!(
                    label = raw,
                    fallback = FALLBACK_PRIORITY.as_str(),
                    "unrecognized priority, using fallback SLA budget"
                );
                FALLBACK_PRIORITY
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Breached,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Breached => "BREACHED",
        }
    }

    /// Coarse label shown to responders; not a real probability.
    pub fn breach_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "40-60%",
            RiskLevel::High => "80-99%",
            RiskLevel::Breached => "100%",
        }
    }

    fn from_elapsed_percent(percent: f64) -> Self {
        if percent > 100.0 {
            RiskLevel::Breached
        } else if percent > 75.0 {
            RiskLevel::High
        } else if percent > 50.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaAssessment {
    pub risk_level: RiskLevel,
    pub breach_probability: &'static str,
    pub age_hours: f64,
    pub sla_limit_hours: u32,
}

pub fn classify(now: DateTime<Utc>, created_at: DateTime<Utc>, priority: Option<&str>) -> SlaAssessment {
    let age_hours = (now - created_at).num_milliseconds() as f64 / 3_600_000.0;
    classify_age(age_hours, priority)
}

pub fn classify_age(age_hours: f64, priority: Option<&str>) -> SlaAssessment {
    let limit = Priority::resolve(priority).budget_hours();
    let risk_level = RiskLevel::from_elapsed_percent(age_hours / f64::from(limit) * 100.0);

    SlaAssessment {
        risk_level,
        breach_probability: risk_level.breach_label(),
        age_hours: (age_hours * 10.0).round() / 10.0,
        sla_limit_hours: limit,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn risk(age_hours: f64, priority: &str) -> RiskLevel {
        classify_age(age_hours, Some(priority)).risk_level
    }

    #[test]
    fn highest_priority_bands() {
        assert_eq!(risk(1.0, "Highest"), RiskLevel::Low);
        assert_eq!(risk(3.1, "Highest"), RiskLevel::High);
        assert_eq!(risk(5.0, "Highest"), RiskLevel::Breached);
    }

    #[test]
    fn high_priority_bands() {
        assert_eq!(risk(10.0, "High"), RiskLevel::Low);
        assert_eq!(risk(13.0, "High"), RiskLevel::Medium);
        assert_eq!(risk(20.0, "High"), RiskLevel::High);
    }

    #[test]
    fn unknown_priority_uses_medium_budget() {
        let assessment = classify_age(40.0, Some("Unknown"));
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.sla_limit_hours, 48);

        assert_eq!(classify_age(40.0, None).sla_limit_hours, 48);
    }

    #[test]
    fn boundaries_fall_into_lower_band() {
        assert_eq!(risk(24.0, "Medium"), RiskLevel::Low);
        assert_eq!(risk(36.0, "Medium"), RiskLevel::Medium);
        assert_eq!(risk(48.0, "Medium"), RiskLevel::High);
    }

    #[test]
    fn labels_match_case_insensitively() {
        assert_eq!(Priority::from_label(" lowest "), Some(Priority::Lowest));
        assert_eq!(classify_age(100.0, Some("LOW")).sla_limit_hours, 72);
    }

    #[test]
    fn rounds_age_and_reports_breach_label() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let now = created + Duration::minutes(5 * 60 + 14);
        let assessment = classify(now, created, Some("Highest"));

        assert_eq!(assessment.age_hours, 5.2);
        assert_eq!(assessment.risk_level, RiskLevel::Breached);
        assert_eq!(assessment.breach_probability, "100%");
        assert_eq!(assessment, classify(now, created, Some("Highest")));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let value = serde_json::to_value(classify_age(1.0, Some("Highest"))).unwrap();
        assert_eq!(value["riskLevel"], "LOW");
        assert_eq!(value["breachProbability"], "Low");
        assert_eq!(value["slaLimitHours"], serde_json::json!(4));
        assert!(value["slaLimitHours"].is_u64());
    }
}
