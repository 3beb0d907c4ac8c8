use serde::{Deserialize, Serialize};

use super::super::domain::{ImpactLevel, RiskLevel};

/// Multipliers applied to the five scoring factors. Weights are not required
/// to sum to 1; totals simply scale with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub priority: f64,
    pub urgency: f64,
    pub impact: f64,
    pub risk: f64,
    pub strategic: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            priority: 0.30,
            urgency: 0.25,
            impact: 0.25,
            risk: 0.15,
            strategic: 0.05,
        }
    }
}

/// Numeric factor value for each impact level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactValues {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl ImpactValues {
    pub fn value_of(&self, level: ImpactLevel) -> f64 {
        match level {
            ImpactLevel::Low => self.low,
            ImpactLevel::Medium => self.medium,
            ImpactLevel::High => self.high,
            ImpactLevel::Critical => self.critical,
        }
    }
}

impl Default for ImpactValues {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 3.0,
            high: 4.0,
            critical: 5.0,
        }
    }
}

/// Numeric factor value for each risk level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskValues {
    pub low: f64,
    pub operational: f64,
    pub safety: f64,
    pub legal: f64,
}

impl RiskValues {
    pub fn value_of(&self, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Operational => self.operational,
            RiskLevel::Safety => self.safety,
            RiskLevel::Legal => self.legal,
        }
    }
}

impl Default for RiskValues {
    fn default() -> Self {
        Self {
            low: 1.0,
            operational: 3.0,
            safety: 5.0,
            legal: 5.0,
        }
    }
}

/// Full scoring configuration: factor weights plus the lookup tables mapping
/// impact and risk levels to factor values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: FactorWeights,
    #[serde(default)]
    pub impact_values: ImpactValues,
    #[serde(default)]
    pub risk_values: RiskValues,
}
