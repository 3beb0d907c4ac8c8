use allot::allocation::domain::{AllocationCycle, AllocationRequest, CycleId, RequestId, RunId};
use allot::allocation::run::AllocationRun;
use allot::allocation::store::{CycleStore, RequestOutcome, RunStore, StoreError};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCycleStore {
    cycles: Arc<Mutex<HashMap<CycleId, AllocationCycle>>>,
    requests: Arc<Mutex<HashMap<RequestId, AllocationRequest>>>,
}

impl CycleStore for InMemoryCycleStore {
    fn insert_cycle(&self, cycle: AllocationCycle) -> Result<AllocationCycle, StoreError> {
        let mut guard = self.cycles.lock().expect("cycle store mutex poisoned");
        if guard.contains_key(&cycle.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(cycle.id.clone(), cycle.clone());
        Ok(cycle)
    }

    fn fetch_cycle(&self, id: &CycleId) -> Result<Option<AllocationCycle>, StoreError> {
        let guard = self.cycles.lock().expect("cycle store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn cycles(&self) -> Result<Vec<AllocationCycle>, StoreError> {
        let guard = self.cycles.lock().expect("cycle store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert_request(
        &self,
        request: AllocationRequest,
    ) -> Result<AllocationRequest, StoreError> {
        let mut guard = self.requests.lock().expect("request store mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<AllocationRequest>, StoreError> {
        let guard = self.requests.lock().expect("request store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn requests_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<AllocationRequest>, StoreError> {
        let guard = self.requests.lock().expect("request store mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| &request.cycle_id == cycle_id)
            .cloned()
            .collect())
    }

    fn record_outcomes(&self, outcomes: &[RequestOutcome]) -> Result<(), StoreError> {
        let mut guard = self.requests.lock().expect("request store mutex poisoned");
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
pub(crate) struct InMemoryRunStore {
    runs: Arc<Mutex<HashMap<RunId, AllocationRun>>>,
}

impl RunStore for InMemoryRunStore {
    fn insert_run(&self, run: AllocationRun) -> Result<AllocationRun, StoreError> {
        let mut guard = self.runs.lock().expect("run store mutex poisoned");
        if guard.contains_key(&run.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    fn fetch_run(&self, id: &RunId) -> Result<Option<AllocationRun>, StoreError> {
        let guard = self.runs.lock().expect("run store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_run(&self, run: AllocationRun) -> Result<(), StoreError> {
        let mut guard = self.runs.lock().expect("run store mutex poisoned");
        if guard.contains_key(&run.id) {
            guard.insert(run.id.clone(), run);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn runs(&self) -> Result<Vec<AllocationRun>, StoreError> {
        let guard = self.runs.lock().expect("run store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
