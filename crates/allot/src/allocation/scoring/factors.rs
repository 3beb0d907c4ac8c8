use chrono::NaiveDate;

use super::super::domain::AllocationRequest;
use super::config::ScoringConfig;
use super::{ScoreBreakdown, ScoreComponent};

const FACTOR_FLOOR: f64 = 1.0;
const FACTOR_CEIL: f64 = 5.0;
const URGENCY_WINDOW_DAYS: f64 = 30.0;

pub(super) fn breakdown(
    request: &AllocationRequest,
    evaluation_date: NaiveDate,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let weights = &config.weights;

    let days_until_deadline = (request.urgency_deadline - evaluation_date).num_days();

    let priority_value = clamp_factor(request.priority);
    let urgency = urgency_value(days_until_deadline);
    let impact_value = config.impact_values.value_of(request.impact);
    let risk_value = config.risk_values.value_of(request.risk);
    let strategic_value = clamp_factor(request.strategic);

    let priority = component(priority_value, weights.priority);
    let urgency = ScoreComponent {
        days_until_deadline: Some(days_until_deadline),
        ..component(urgency, weights.urgency)
    };
    let impact = ScoreComponent {
        category: Some(request.impact.label()),
        ..component(impact_value, weights.impact)
    };
    let risk = ScoreComponent {
        category: Some(request.risk.label()),
        ..component(risk_value, weights.risk)
    };
    let strategic = component(strategic_value, weights.strategic);

    let total_score = priority.contribution
        + urgency.contribution
        + impact.contribution
        + risk.contribution
        + strategic.contribution;

    ScoreBreakdown {
        total_score,
        priority,
        urgency,
        impact,
        risk,
        strategic,
    }
}

/// Past-due deadlines carry maximum urgency; future ones decay by one point
/// per thirty days down to the factor floor.
pub(super) fn urgency_value(days_until_deadline: i64) -> f64 {
    if days_until_deadline <= 0 {
        return FACTOR_CEIL;
    }

    let normalized = (days_until_deadline as f64 / URGENCY_WINDOW_DAYS).min(FACTOR_CEIL - FACTOR_FLOOR);
    (FACTOR_CEIL - normalized).max(FACTOR_FLOOR)
}

fn clamp_factor(raw: u8) -> f64 {
    (raw as f64).clamp(FACTOR_FLOOR, FACTOR_CEIL)
}

fn component(value: f64, weight: f64) -> ScoreComponent {
    ScoreComponent {
        value,
        weight,
        contribution: value * weight,
        days_until_deadline: None,
        category: None,
    }
}
