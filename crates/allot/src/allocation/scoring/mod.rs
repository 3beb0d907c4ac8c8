mod config;
mod factors;

pub use config::{FactorWeights, ImpactValues, RiskValues, ScoringConfig};

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::AllocationRequest;

/// Stateless scorer producing the weighted composite score a run ranks by.
///
/// total = priority x w_p + urgency x w_u + impact x w_i + risk x w_r +
/// strategic x w_s, with every factor value in the 1..=5 band.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, request: &AllocationRequest, evaluation_date: NaiveDate) -> ScoreBreakdown {
        factors::breakdown(request, evaluation_date, &self.config)
    }
}

/// One factor's slice of a score: the raw value, the weight applied to it,
/// and the resulting contribution to the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_deadline: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
}

/// Full factor-by-factor decomposition of one request's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total_score: f64,
    pub priority: ScoreComponent,
    pub urgency: ScoreComponent,
    pub impact: ScoreComponent,
    pub risk: ScoreComponent,
    pub strategic: ScoreComponent,
}
