use chrono::Duration;

use super::common::*;
use crate::allocation::domain::{ImpactLevel, RiskLevel};
use crate::allocation::scoring::{FactorWeights, ImpactValues, ScoringConfig, ScoringEngine};

#[test]
fn urgency_decays_in_thirty_day_steps() {
    let engine = ScoringEngine::default();
    let today = evaluation_date();

    for (days, expected) in [(0, 5.0), (30, 4.0), (60, 3.0), (90, 2.0), (120, 1.0)] {
        let mut request = money_request("req-000001", 100.0, None);
        request.urgency_deadline = today + Duration::days(days);

        let breakdown = engine.score(&request, today);

        assert_eq!(breakdown.urgency.value, expected, "at {days} days out");
        assert_eq!(breakdown.urgency.days_until_deadline, Some(days));
    }
}

#[test]
fn urgency_floors_beyond_the_decay_window() {
    let engine = ScoringEngine::default();
    let today = evaluation_date();
    let mut request = money_request("req-000001", 100.0, None);
    request.urgency_deadline = today + Duration::days(400);

    let breakdown = engine.score(&request, today);

    assert_eq!(breakdown.urgency.value, 1.0);
}

#[test]
fn past_deadlines_score_maximum_urgency() {
    let engine = ScoringEngine::default();
    let today = evaluation_date();
    let mut request = money_request("req-000001", 100.0, None);
    request.urgency_deadline = today - Duration::days(14);

    let breakdown = engine.score(&request, today);

    assert_eq!(breakdown.urgency.value, 5.0);
    assert_eq!(breakdown.urgency.days_until_deadline, Some(-14));
}

#[test]
fn rated_factors_clamp_into_the_scoring_band() {
    let engine = ScoringEngine::default();
    let mut request = money_request("req-000001", 100.0, None);
    request.priority = 0;
    request.strategic = 9;

    let breakdown = engine.score(&request, evaluation_date());

    assert_eq!(breakdown.priority.value, 1.0);
    assert_eq!(breakdown.strategic.value, 5.0);
}

#[test]
fn contributions_multiply_value_by_weight() {
    let engine = ScoringEngine::default();
    let request = money_request("req-000001", 100.0, None);

    let breakdown = engine.score(&request, evaluation_date());

    for component in [
        breakdown.priority,
        breakdown.urgency,
        breakdown.impact,
        breakdown.risk,
        breakdown.strategic,
    ] {
        assert_eq!(component.contribution, component.value * component.weight);
    }
    let summed = breakdown.priority.contribution
        + breakdown.urgency.contribution
        + breakdown.impact.contribution
        + breakdown.risk.contribution
        + breakdown.strategic.contribution;
    assert_eq!(breakdown.total_score, summed);
}

#[test]
fn top_rated_request_reaches_the_band_ceiling() {
    let engine = ScoringEngine::default();
    let today = evaluation_date();
    let mut request = money_request("req-000001", 100.0, None);
    request.priority = 5;
    request.strategic = 5;
    request.impact = ImpactLevel::Critical;
    request.risk = RiskLevel::Safety;
    request.urgency_deadline = today;

    let breakdown = engine.score(&request, today);

    assert_eq!(breakdown.total_score, 5.0);
}

#[test]
fn components_record_the_inputs_behind_each_factor() {
    let engine = ScoringEngine::default();
    let mut request = money_request("req-000001", 100.0, None);
    request.impact = ImpactLevel::High;
    request.risk = RiskLevel::Legal;

    let breakdown = engine.score(&request, evaluation_date());

    assert_eq!(breakdown.impact.category, Some("HIGH"));
    assert_eq!(breakdown.risk.category, Some("LEGAL"));
    assert_eq!(breakdown.priority.category, None);
    assert_eq!(breakdown.priority.days_until_deadline, None);
    assert_eq!(breakdown.impact.value, 4.0);
    assert_eq!(breakdown.risk.value, 5.0);
}

#[test]
fn custom_weights_and_value_tables_flow_through() {
    let config = ScoringConfig {
        weights: FactorWeights {
            priority: 1.0,
            urgency: 0.0,
            impact: 0.0,
            risk: 0.0,
            strategic: 0.0,
        },
        impact_values: ImpactValues {
            medium: 2.5,
            ..ImpactValues::default()
        },
        ..ScoringConfig::default()
    };
    let engine = ScoringEngine::new(config);
    let mut request = money_request("req-000001", 100.0, None);
    request.priority = 4;

    let breakdown = engine.score(&request, evaluation_date());

    assert_eq!(breakdown.impact.value, 2.5);
    assert_eq!(breakdown.impact.contribution, 0.0);
    assert_eq!(breakdown.total_score, 4.0);
}
