use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::{error, info, warn};

use super::domain::{
    AllocationCycle, AllocationRequest, CycleId, CycleStatus, CycleSubmission, RequestId,
    RequestStatus, RequestSubmission, ResourceCategory, RunId,
};
use super::engine::AllocationEngine;
use super::intake::{self, IntakeViolation};
use super::run::{AllocationRun, ProgressSink, RunOptions, RunPhase, RunStatus, RunTrigger};
use super::scoring::{ScoringConfig, ScoringEngine};
use super::store::{CycleStore, RequestOutcome, RunStore, StoreError};

/// Version stamp recorded on every run so stored decisions can be traced to
/// the engine that produced them.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service composing intake validation, the stores, and the allocation
/// engine. Runs execute on a background task; callers poll the run record.
pub struct AllocationService<C, R> {
    cycles: Arc<C>,
    runs: Arc<R>,
    engine: Arc<AllocationEngine>,
}

static CYCLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_cycle_id() -> CycleId {
    let id = CYCLE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CycleId(format!("cycle-{id:06}"))
}

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

fn next_run_id() -> RunId {
    let id = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RunId(format!("run-{id:06}"))
}

impl<C, R> AllocationService<C, R>
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    pub fn new(cycles: Arc<C>, runs: Arc<R>, config: ScoringConfig) -> Self {
        Self {
            cycles,
            runs,
            engine: Arc::new(AllocationEngine::new(ScoringEngine::new(config))),
        }
    }

    /// Validate and persist a new cycle.
    pub fn create_cycle(
        &self,
        submission: CycleSubmission,
    ) -> Result<AllocationCycle, AllocationServiceError> {
        let cycle = intake::cycle_from_submission(next_cycle_id(), Utc::now(), submission)?;
        let stored = self.cycles.insert_cycle(cycle)?;
        Ok(stored)
    }

    pub fn get_cycle(&self, id: &CycleId) -> Result<AllocationCycle, AllocationServiceError> {
        let cycle = self.cycles.fetch_cycle(id)?.ok_or(StoreError::NotFound)?;
        Ok(cycle)
    }

    pub fn list_cycles(
        &self,
        status: Option<CycleStatus>,
    ) -> Result<Vec<AllocationCycle>, AllocationServiceError> {
        let mut cycles = self.cycles.cycles()?;
        if let Some(status) = status {
            cycles.retain(|cycle| cycle.status == status);
        }
        cycles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(cycles)
    }

    /// Validate and persist a new request under an existing cycle.
    pub fn create_request(
        &self,
        submission: RequestSubmission,
    ) -> Result<AllocationRequest, AllocationServiceError> {
        self.cycles
            .fetch_cycle(&submission.cycle_id)?
            .ok_or(StoreError::NotFound)?;

        let request = intake::request_from_submission(next_request_id(), Utc::now(), submission)?;
        let stored = self.cycles.insert_request(request)?;
        Ok(stored)
    }

    pub fn get_request(&self, id: &RequestId) -> Result<AllocationRequest, AllocationServiceError> {
        let request = self.cycles.fetch_request(id)?.ok_or(StoreError::NotFound)?;
        Ok(request)
    }

    /// List a cycle's requests, most specific filter first: a status filter
    /// takes precedence over a category filter.
    pub fn list_requests(
        &self,
        cycle_id: &CycleId,
        status: Option<RequestStatus>,
        category: Option<ResourceCategory>,
    ) -> Result<Vec<AllocationRequest>, AllocationServiceError> {
        self.cycles
            .fetch_cycle(cycle_id)?
            .ok_or(StoreError::NotFound)?;

        let mut requests = self.cycles.requests_for_cycle(cycle_id)?;
        if let Some(status) = status {
            requests.retain(|request| request.status == status);
        } else if let Some(category) = category {
            requests.retain(|request| request.ask.category() == category);
        }
        requests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(requests)
    }

    /// Record a pending run, kick off execution on a background task, and
    /// return the pending record immediately. Requires a Tokio runtime.
    pub fn start_run(&self, trigger: RunTrigger) -> Result<AllocationRun, AllocationServiceError> {
        let cycle = self
            .cycles
            .fetch_cycle(&trigger.cycle_id)?
            .ok_or(StoreError::NotFound)?;

        let options = RunOptions {
            allow_partial_allocations: trigger
                .allow_partial_allocations
                .unwrap_or(cycle.allow_partial_allocations),
            evaluation_date: trigger
                .evaluation_date
                .unwrap_or_else(|| Local::now().date_naive()),
        };

        let run = AllocationRun {
            id: next_run_id(),
            cycle_id: cycle.id.clone(),
            status: RunStatus::Pending,
            engine_version: ENGINE_VERSION.to_string(),
            allow_partial_allocations: options.allow_partial_allocations,
            evaluation_date: options.evaluation_date,
            notes: trigger.notes,
            progress: 0.0,
            current_phase: None,
            decisions: Vec::new(),
            summary: None,
            error_message: None,
            execution_time_ms: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };

        let stored = self.runs.insert_run(run)?;
        self.spawn_run(stored.clone(), options);
        Ok(stored)
    }

    pub fn get_run(&self, id: &RunId) -> Result<AllocationRun, AllocationServiceError> {
        let run = self.runs.fetch_run(id)?.ok_or(StoreError::NotFound)?;
        Ok(run)
    }

    /// List runs newest first. A cycle filter takes precedence over a status
    /// filter.
    pub fn list_runs(
        &self,
        cycle_id: Option<&CycleId>,
        status: Option<RunStatus>,
    ) -> Result<Vec<AllocationRun>, AllocationServiceError> {
        let mut runs = self.runs.runs()?;
        if let Some(cycle_id) = cycle_id {
            runs.retain(|run| run.cycle_id == *cycle_id);
        } else if let Some(status) = status {
            runs.retain(|run| run.status == status);
        }
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(runs)
    }

    fn spawn_run(&self, run: AllocationRun, options: RunOptions) {
        let engine = Arc::clone(&self.engine);
        let cycles = Arc::clone(&self.cycles);
        let runs = Arc::clone(&self.runs);

        tokio::spawn(async move {
            execute_run(engine.as_ref(), cycles.as_ref(), runs.as_ref(), run, options);
        });
    }
}

/// Drive one run to a terminal state. Every store failure downgrades the run
/// rather than panicking the task.
fn execute_run<C, R>(
    engine: &AllocationEngine,
    cycles: &C,
    runs: &R,
    mut run: AllocationRun,
    options: RunOptions,
) where
    C: CycleStore,
    R: RunStore,
{
    let run_id = run.id.clone();
    let started_at = Utc::now();

    run.status = RunStatus::Running;
    run.started_at = Some(started_at);
    if let Err(err) = runs.update_run(run.clone()) {
        error!(run = %run_id.0, error = %err, "failed to mark allocation run running");
        return;
    }

    info!(run = %run_id.0, cycle = %run.cycle_id.0, "allocation run started");

    let cycle = match cycles.fetch_cycle(&run.cycle_id) {
        Ok(Some(cycle)) => cycle,
        Ok(None) => {
            fail_run(runs, run, "allocation cycle disappeared before execution".to_string());
            return;
        }
        Err(err) => {
            fail_run(runs, run, err.to_string());
            return;
        }
    };
    let requests = match cycles.requests_for_cycle(&run.cycle_id) {
        Ok(mut requests) => {
            requests.sort_by(|a, b| a.id.cmp(&b.id));
            requests
        }
        Err(err) => {
            fail_run(runs, run, err.to_string());
            return;
        }
    };

    let progress = StoreProgress {
        runs,
        run_id: &run_id,
    };

    match engine.execute(&cycle, &requests, &options, &progress) {
        Ok(outcome) => {
            let outcomes: Vec<RequestOutcome> = outcome
                .decisions
                .iter()
                .map(|decision| RequestOutcome {
                    request_id: decision.request_id.clone(),
                    status: decision.status,
                    score: decision.score,
                })
                .collect();
            if let Err(err) = cycles.record_outcomes(&outcomes) {
                warn!(run = %run_id.0, error = %err, "request score write-back failed");
            }

            let completed_at = Utc::now();
            run.status = RunStatus::Completed;
            run.progress = 1.0;
            run.current_phase = Some(RunPhase::Completed.label().to_string());
            run.decisions = outcome.decisions;
            run.summary = Some(outcome.summary);
            run.completed_at = Some(completed_at);
            run.execution_time_ms = Some(elapsed_ms(started_at, completed_at));

            match runs.update_run(run) {
                Ok(()) => info!(run = %run_id.0, "allocation run completed"),
                Err(err) => {
                    error!(run = %run_id.0, error = %err, "failed to finalize allocation run")
                }
            }
        }
        Err(err) => {
            info!(run = %run_id.0, error = %err, "allocation run failed");
            fail_run(runs, run, err.to_string());
        }
    }
}

fn fail_run<R: RunStore>(runs: &R, mut run: AllocationRun, message: String) {
    run.status = RunStatus::Failed;
    run.error_message = Some(message);
    run.completed_at = Some(Utc::now());
    if let Err(err) = runs.update_run(run) {
        error!(error = %err, "failed to record allocation run failure");
    }
}

fn elapsed_ms(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> u64 {
    (completed_at - started_at).num_milliseconds().max(0) as u64
}

/// Progress sink that writes phase transitions onto the stored run record.
/// Failures to persist progress are logged and swallowed; they never stop a
/// run.
struct StoreProgress<'a, R> {
    runs: &'a R,
    run_id: &'a RunId,
}

impl<R: RunStore> ProgressSink for StoreProgress<'_, R> {
    fn phase(&self, phase: RunPhase) {
        let mut record = match self.runs.fetch_run(self.run_id) {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(err) => {
                warn!(run = %self.run_id.0, error = %err, "failed to load run for progress update");
                return;
            }
        };

        record.progress = phase.progress();
        record.current_phase = Some(phase.label().to_string());

        if let Err(err) = self.runs.update_run(record) {
            warn!(run = %self.run_id.0, error = %err, "failed to record run progress");
        }
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}
