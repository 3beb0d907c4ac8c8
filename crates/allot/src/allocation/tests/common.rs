use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::allocation::domain::{
    AllocationCycle, AllocationRequest, BudgetPool, CycleId, CycleStatus, CycleSubmission,
    ImpactLevel, RequestAsk, RequestId, RequestStatus, RequestSubmission, ResourceCategory,
    ResourcePool, RiskLevel, RunId,
};
use crate::allocation::run::{AllocationRun, RunOptions};
use crate::allocation::scoring::ScoringConfig;
use crate::allocation::service::AllocationService;
use crate::allocation::store::{CycleStore, RequestOutcome, RunStore, StoreError};
use crate::allocation::allocation_router;

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

pub(super) fn run_options() -> RunOptions {
    RunOptions {
        allow_partial_allocations: true,
        evaluation_date: evaluation_date(),
    }
}

pub(super) fn budget_pool(category: ResourceCategory, total: f64) -> BudgetPool {
    BudgetPool {
        category,
        total_amount: total,
        allocated_amount: 0.0,
        currency: "USD".to_string(),
    }
}

pub(super) fn resource_pool(
    category: ResourceCategory,
    resource_type: &str,
    total: f64,
) -> ResourcePool {
    ResourcePool {
        category,
        resource_type: resource_type.to_string(),
        total_quantity: total,
        allocated_quantity: 0.0,
        unit: "COUNT".to_string(),
        exclusive: false,
    }
}

pub(super) fn cycle_with_pools(
    budget_pools: Vec<BudgetPool>,
    resource_pools: Vec<ResourcePool>,
) -> AllocationCycle {
    AllocationCycle {
        id: CycleId("cycle-000001".to_string()),
        name: "Q2 planning".to_string(),
        description: None,
        status: CycleStatus::Draft,
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        budget_pools,
        resource_pools,
        allow_partial_allocations: true,
        created_at: Utc::now(),
    }
}

pub(super) fn money_cycle(total: f64) -> AllocationCycle {
    cycle_with_pools(vec![budget_pool(ResourceCategory::Money, total)], Vec::new())
}

pub(super) fn money_request(id: &str, amount: f64, minimum_viable: Option<f64>) -> AllocationRequest {
    AllocationRequest {
        id: RequestId(id.to_string()),
        cycle_id: CycleId("cycle-000001".to_string()),
        title: format!("Request {id}"),
        description: None,
        justification: None,
        ask: RequestAsk::Money {
            amount,
            minimum_viable,
        },
        priority: 3,
        urgency_deadline: NaiveDate::from_ymd_opt(2025, 4, 15).expect("valid date"),
        impact: ImpactLevel::Medium,
        risk: RiskLevel::Low,
        strategic: 3,
        dependencies: Vec::new(),
        status: RequestStatus::Pending,
        score: None,
        created_at: Utc::now(),
    }
}

pub(super) fn resource_request(
    id: &str,
    category: ResourceCategory,
    resource_type: &str,
    quantity: f64,
    minimum_viable: Option<f64>,
) -> AllocationRequest {
    AllocationRequest {
        ask: RequestAsk::Resource {
            category,
            resource_type: resource_type.to_string(),
            quantity,
            minimum_viable,
        },
        ..money_request(id, 0.0, None)
    }
}

pub(super) fn cycle_submission(name: &str, total: f64) -> CycleSubmission {
    CycleSubmission {
        name: name.to_string(),
        description: None,
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        budget_pools: vec![budget_pool(ResourceCategory::Money, total)],
        resource_pools: Vec::new(),
        allow_partial_allocations: None,
    }
}

pub(super) fn request_submission(cycle_id: &CycleId, amount: f64) -> RequestSubmission {
    RequestSubmission {
        cycle_id: cycle_id.clone(),
        title: "Fleet maintenance".to_string(),
        description: None,
        justification: None,
        category: ResourceCategory::Money,
        resource_type: None,
        amount_requested: Some(amount),
        quantity_requested: None,
        minimum_viable_allocation: None,
        minimum_viable_quantity: None,
        priority: 3,
        urgency_deadline: NaiveDate::from_ymd_opt(2025, 4, 15).expect("valid date"),
        impact: ImpactLevel::Medium,
        risk: RiskLevel::Low,
        strategic: 3,
        dependencies: Vec::new(),
    }
}

pub(super) fn build_service() -> (
    AllocationService<MemoryCycleStore, MemoryRunStore>,
    Arc<MemoryCycleStore>,
    Arc<MemoryRunStore>,
) {
    let cycles = Arc::new(MemoryCycleStore::default());
    let runs = Arc::new(MemoryRunStore::default());
    let service = AllocationService::new(cycles.clone(), runs.clone(), ScoringConfig::default());
    (service, cycles, runs)
}

pub(super) fn allocation_router_with_service(
    service: AllocationService<MemoryCycleStore, MemoryRunStore>,
) -> axum::Router {
    allocation_router(Arc::new(service))
}

pub(super) async fn wait_for_run<C, R>(service: &AllocationService<C, R>, run_id: &RunId) -> AllocationRun
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    for _ in 0..200 {
        let run = service.get_run(run_id).expect("run exists");
        if run.status.is_terminal() {
            return run;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {} did not reach a terminal state", run_id.0);
}

#[derive(Default, Clone)]
pub(super) struct MemoryCycleStore {
    cycles: Arc<Mutex<HashMap<CycleId, AllocationCycle>>>,
    requests: Arc<Mutex<HashMap<RequestId, AllocationRequest>>>,
}

impl CycleStore for MemoryCycleStore {
    fn insert_cycle(&self, cycle: AllocationCycle) -> Result<AllocationCycle, StoreError> {
        let mut guard = self.cycles.lock().expect("cycle mutex poisoned");
        if guard.contains_key(&cycle.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(cycle.id.clone(), cycle.clone());
        Ok(cycle)
    }

    fn fetch_cycle(&self, id: &CycleId) -> Result<Option<AllocationCycle>, StoreError> {
        let guard = self.cycles.lock().expect("cycle mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn cycles(&self) -> Result<Vec<AllocationCycle>, StoreError> {
        let guard = self.cycles.lock().expect("cycle mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert_request(
        &self,
        request: AllocationRequest,
    ) -> Result<AllocationRequest, StoreError> {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<AllocationRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn requests_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<AllocationRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| request.cycle_id == *cycle_id)
            .cloned()
            .collect())
    }

    fn record_outcomes(&self, outcomes: &[RequestOutcome]) -> Result<(), StoreError> {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        for outcome in outcomes {
            if let Some(request) = guard.get_mut(&outcome.request_id) {
                request.status = outcome.status;
                request.score = Some(outcome.score);
            }
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRunStore {
    runs: Arc<Mutex<HashMap<RunId, AllocationRun>>>,
}

impl RunStore for MemoryRunStore {
    fn insert_run(&self, run: AllocationRun) -> Result<AllocationRun, StoreError> {
        let mut guard = self.runs.lock().expect("run mutex poisoned");
        if guard.contains_key(&run.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    fn fetch_run(&self, id: &RunId) -> Result<Option<AllocationRun>, StoreError> {
        let guard = self.runs.lock().expect("run mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_run(&self, run: AllocationRun) -> Result<(), StoreError> {
        let mut guard = self.runs.lock().expect("run mutex poisoned");
        if !guard.contains_key(&run.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(run.id.clone(), run);
        Ok(())
    }

    fn runs(&self) -> Result<Vec<AllocationRun>, StoreError> {
        let guard = self.runs.lock().expect("run mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableCycleStore;

impl CycleStore for UnavailableCycleStore {
    fn insert_cycle(&self, _cycle: AllocationCycle) -> Result<AllocationCycle, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_cycle(&self, _id: &CycleId) -> Result<Option<AllocationCycle>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn cycles(&self) -> Result<Vec<AllocationCycle>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_request(
        &self,
        _request: AllocationRequest,
    ) -> Result<AllocationRequest, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_request(&self, _id: &RequestId) -> Result<Option<AllocationRequest>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn requests_for_cycle(
        &self,
        _cycle_id: &CycleId,
    ) -> Result<Vec<AllocationRequest>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn record_outcomes(&self, _outcomes: &[RequestOutcome]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
