use super::domain::{AllocationCycle, AllocationRequest, CycleId, RequestId, RequestStatus, RunId};
use super::run::AllocationRun;

/// Storage abstraction for cycles and their requests so the service module
/// can be exercised in isolation. Listing methods return records in no
/// particular order; callers sort.
pub trait CycleStore: Send + Sync {
    fn insert_cycle(&self, cycle: AllocationCycle) -> Result<AllocationCycle, StoreError>;
    fn fetch_cycle(&self, id: &CycleId) -> Result<Option<AllocationCycle>, StoreError>;
    fn cycles(&self) -> Result<Vec<AllocationCycle>, StoreError>;
    fn insert_request(&self, request: AllocationRequest)
        -> Result<AllocationRequest, StoreError>;
    fn fetch_request(&self, id: &RequestId) -> Result<Option<AllocationRequest>, StoreError>;
    fn requests_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<AllocationRequest>, StoreError>;
    /// Mirror run outcomes back onto stored requests. Outcomes naming unknown
    /// requests are skipped.
    fn record_outcomes(&self, outcomes: &[RequestOutcome]) -> Result<(), StoreError>;
}

/// Storage abstraction for run records.
pub trait RunStore: Send + Sync {
    fn insert_run(&self, run: AllocationRun) -> Result<AllocationRun, StoreError>;
    fn fetch_run(&self, id: &RunId) -> Result<Option<AllocationRun>, StoreError>;
    fn update_run(&self, run: AllocationRun) -> Result<(), StoreError>;
    fn runs(&self) -> Result<Vec<AllocationRun>, StoreError>;
}

/// Status and score a completed run writes back onto a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub score: f64,
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
