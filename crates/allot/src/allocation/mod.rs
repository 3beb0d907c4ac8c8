//! Resource allocation workflows: cycles, the requests competing within
//! them, and the scoring plus greedy-allocation engine that decides every
//! request in a single ranked pass.

pub mod constraints;
pub mod domain;
pub mod engine;
pub mod explain;
pub(crate) mod intake;
pub mod router;
pub mod run;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use constraints::{ConstraintEngine, CycleValidationError};
pub use domain::{
    AllocationCycle, AllocationRequest, BudgetPool, CycleId, CycleStatus, CycleSubmission,
    ImpactLevel, RequestAsk, RequestId, RequestStatus, RequestSubmission, RequestView,
    ResourceCategory, ResourcePool, RiskLevel, RunId,
};
pub use engine::{AllocationEngine, EngineError, RunOutcome};
pub use explain::{DecisionExplanation, RankComparison};
pub use intake::IntakeViolation;
pub use router::{allocation_router, PageView};
pub use run::{
    AllocationDecision, AllocationRun, ConstraintViolation, NullProgress, ProgressSink,
    RunOptions, RunPhase, RunStatus, RunSummary, RunTrigger,
};
pub use scoring::{
    FactorWeights, ImpactValues, RiskValues, ScoreBreakdown, ScoreComponent, ScoringConfig,
    ScoringEngine,
};
pub use service::{AllocationService, AllocationServiceError, ENGINE_VERSION};
pub use store::{CycleStore, RequestOutcome, RunStore, StoreError};
