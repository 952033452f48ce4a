use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlippageRisk {
    Low,
    High,
}

impl SlippageRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlippageRisk::Low => "LOW",
            SlippageRisk::High => "HIGH",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            SlippageRisk::Low => "On track.",
            SlippageRisk::High => "Scope cut required: remove low priority tickets.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintReport {
    pub velocity: u32,
    pub remaining_points: u32,
    pub days_left: u32,
    pub risk_level: SlippageRisk,
    pub recommendation: &'static str,
}

/// Flags a sprint as slipping when the daily burn it still needs exceeds a
/// tenth of its velocity.
pub fn predict(velocity: u32, remaining_points: u32, days_left: u32) -> AppResult<SprintReport> {
    if days_left == 0 {
        return Err(AppError::Validation(
            "days left must be greater than zero".to_string(),
        ));
    }

    let required_burn = f64::from(remaining_points) / f64::from(days_left);
    let risk_level = if required_burn > f64::from(velocity) / 10.0 {
        SlippageRisk::High
    } else {
        SlippageRisk::Low
    };

    Ok(SprintReport {
        velocity,
        remaining_points,
        days_left,
        risk_level,
        recommendation: risk_level.recommendation(),
    })
}
