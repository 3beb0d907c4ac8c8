use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CycleId, RequestId, RequestStatus, RunId};
use super::explain::DecisionExplanation;

/// Lifecycle of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// Interior checkpoints of a run, reported through a `ProgressSink` so
/// pollers can watch a run advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Scoring,
    Ranking,
    Allocating,
    Explaining,
    Finalizing,
    Completed,
}

impl RunPhase {
    pub const fn label(self) -> &'static str {
        match self {
            RunPhase::Scoring => "Scoring requests",
            RunPhase::Ranking => "Ranking requests",
            RunPhase::Allocating => "Allocating resources",
            RunPhase::Explaining => "Generating explanations",
            RunPhase::Finalizing => "Finalizing",
            RunPhase::Completed => "Completed",
        }
    }

    pub const fn progress(self) -> f64 {
        match self {
            RunPhase::Scoring => 0.1,
            RunPhase::Ranking => 0.2,
            RunPhase::Allocating => 0.3,
            RunPhase::Explaining => 0.8,
            RunPhase::Finalizing => 0.95,
            RunPhase::Completed => 1.0,
        }
    }
}

/// Machine-readable tag explaining why a decision fell short of full funding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintViolation {
    DependencyNotMet,
    BudgetLimited,
    BudgetExhausted,
    ResourceLimited,
    ResourceExhausted,
    BelowMinimumViable,
}

/// The per-request outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDecision {
    pub request_id: RequestId,
    pub request_title: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_requested: Option<f64>,
    pub amount_allocated: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_requested: Option<f64>,
    pub quantity_allocated: f64,
    pub score: f64,
    pub rank: usize,
    pub reason: String,
    pub constraint_violations: Vec<ConstraintViolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<DecisionExplanation>,
}

/// Aggregate counts and totals for one completed run. `total_allocated` sums
/// monetary awards only; quantities are never added to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_requests: usize,
    pub approved: usize,
    pub partial: usize,
    pub deferred: usize,
    pub denied: usize,
    pub total_allocated: f64,
    pub budget_utilization: f64,
}

/// Options resolved when a run starts and fixed for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub allow_partial_allocations: bool,
    pub evaluation_date: NaiveDate,
}

/// A single execution of the allocation engine against one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRun {
    pub id: RunId,
    pub cycle_id: CycleId,
    pub status: RunStatus,
    pub engine_version: String,
    pub allow_partial_allocations: bool,
    pub evaluation_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    pub decisions: Vec<AllocationDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Client payload for starting a run against a cycle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTrigger {
    pub cycle_id: CycleId,
    #[serde(default)]
    pub allow_partial_allocations: Option<bool>,
    #[serde(default)]
    pub evaluation_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Receives phase transitions while the engine works. The service backs this
/// with run-store updates; tests usually pass `NullProgress`.
pub trait ProgressSink: Send + Sync {
    fn phase(&self, phase: RunPhase);
}

/// Sink that drops every phase transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn phase(&self, _phase: RunPhase) {}
}
