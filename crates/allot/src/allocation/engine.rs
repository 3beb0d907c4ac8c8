use std::collections::HashMap;

use super::constraints::{ConstraintEngine, CycleValidationError};
use super::domain::{
    AllocationCycle, AllocationRequest, RequestAsk, RequestId, RequestStatus, ResourceCategory,
};
use super::explain;
use super::run::{
    AllocationDecision, ConstraintViolation, ProgressSink, RunOptions, RunPhase, RunSummary,
};
use super::scoring::{ScoreBreakdown, ScoringEngine};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] CycleValidationError),
}

/// Everything one allocation pass hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub decisions: Vec<AllocationDecision>,
    pub summary: RunSummary,
}

/// Orchestrates one allocation pass: validate, score, rank, then walk the
/// ranked sequence exactly once while consuming pool capacity, and finally
/// explain and summarize the decisions.
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    scoring: ScoringEngine,
    constraints: ConstraintEngine,
}

struct ScoredRequest<'a> {
    request: &'a AllocationRequest,
    breakdown: ScoreBreakdown,
}

impl AllocationEngine {
    pub fn new(scoring: ScoringEngine) -> Self {
        Self {
            scoring,
            constraints: ConstraintEngine,
        }
    }

    pub fn execute(
        &self,
        cycle: &AllocationCycle,
        requests: &[AllocationRequest],
        options: &RunOptions,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome, EngineError> {
        self.constraints.validate_cycle(cycle, requests)?;

        progress.phase(RunPhase::Scoring);
        let mut scored: Vec<ScoredRequest<'_>> = requests
            .iter()
            .map(|request| ScoredRequest {
                request,
                breakdown: self.scoring.score(request, options.evaluation_date),
            })
            .collect();

        progress.phase(RunPhase::Ranking);
        scored.sort_by(|a, b| {
            b.breakdown
                .total_score
                .total_cmp(&a.breakdown.total_score)
                .then_with(|| a.request.id.cmp(&b.request.id))
        });

        progress.phase(RunPhase::Allocating);
        let mut budget_remaining = budget_remaining_by_category(cycle);
        let mut resource_remaining = resource_remaining_by_kind(cycle);
        let mut decided: HashMap<RequestId, AllocationDecision> = HashMap::new();
        let mut decisions: Vec<AllocationDecision> = Vec::with_capacity(scored.len());

        for (index, entry) in scored.iter().enumerate() {
            let request = entry.request;
            let mut decision = base_decision(request, entry.breakdown.total_score, index + 1);

            if !self.constraints.dependencies_satisfied(request, &decided) {
                defer(&mut decision);
            } else {
                match &request.ask {
                    RequestAsk::Money {
                        amount,
                        minimum_viable,
                    } => allocate_monetary(
                        &mut decision,
                        *amount,
                        *minimum_viable,
                        &mut budget_remaining,
                        options.allow_partial_allocations,
                    ),
                    RequestAsk::Resource {
                        category,
                        resource_type,
                        quantity,
                        minimum_viable,
                    } => allocate_resource(
                        &mut decision,
                        *category,
                        resource_type,
                        *quantity,
                        *minimum_viable,
                        &mut resource_remaining,
                        options.allow_partial_allocations,
                    ),
                }
            }

            decided.insert(request.id.clone(), decision.clone());
            decisions.push(decision);
        }

        progress.phase(RunPhase::Explaining);
        let breakdowns: Vec<ScoreBreakdown> = scored.iter().map(|entry| entry.breakdown).collect();
        explain::attach_explanations(&mut decisions, &breakdowns);

        progress.phase(RunPhase::Finalizing);
        let summary = summarize(cycle, &decisions);

        Ok(RunOutcome { decisions, summary })
    }
}

/// Pools sharing a category pour into one bucket; a run draws against the
/// summed capacity, never against individual pool records.
fn budget_remaining_by_category(cycle: &AllocationCycle) -> HashMap<ResourceCategory, f64> {
    let mut remaining = HashMap::new();
    for pool in &cycle.budget_pools {
        *remaining.entry(pool.category).or_insert(0.0) += pool.total_amount;
    }
    remaining
}

fn resource_remaining_by_kind(cycle: &AllocationCycle) -> HashMap<(ResourceCategory, String), f64> {
    let mut remaining = HashMap::new();
    for pool in &cycle.resource_pools {
        *remaining
            .entry((pool.category, pool.resource_type.clone()))
            .or_insert(0.0) += pool.total_quantity;
    }
    remaining
}

fn base_decision(request: &AllocationRequest, score: f64, rank: usize) -> AllocationDecision {
    let (amount_requested, quantity_requested) = match &request.ask {
        RequestAsk::Money { amount, .. } => (Some(*amount), None),
        RequestAsk::Resource { quantity, .. } => (None, Some(*quantity)),
    };

    AllocationDecision {
        request_id: request.id.clone(),
        request_title: request.title.clone(),
        status: RequestStatus::Pending,
        amount_requested,
        amount_allocated: 0.0,
        quantity_requested,
        quantity_allocated: 0.0,
        score,
        rank,
        reason: String::new(),
        constraint_violations: Vec::new(),
        explanation: None,
    }
}

fn defer(decision: &mut AllocationDecision) {
    decision.status = RequestStatus::Deferred;
    decision.reason = "Dependencies not met".to_string();
    decision
        .constraint_violations
        .push(ConstraintViolation::DependencyNotMet);
}

fn allocate_monetary(
    decision: &mut AllocationDecision,
    requested: f64,
    minimum_viable: Option<f64>,
    budget_remaining: &mut HashMap<ResourceCategory, f64>,
    allow_partials: bool,
) {
    let remaining = budget_remaining
        .entry(ResourceCategory::Money)
        .or_insert(0.0);

    if *remaining >= requested {
        decision.status = RequestStatus::Approved;
        decision.amount_allocated = requested;
        decision.reason = "Fully funded".to_string();
        *remaining -= requested;
    } else if allow_partials && minimum_viable.is_some_and(|minimum| *remaining >= minimum) {
        decision.status = RequestStatus::Partial;
        decision.amount_allocated = *remaining;
        decision.reason = "Partially funded - budget constraint".to_string();
        decision
            .constraint_violations
            .push(ConstraintViolation::BudgetLimited);
        *remaining = 0.0;
    } else {
        decision.status = RequestStatus::Denied;
        decision.amount_allocated = 0.0;
        if *remaining <= 0.0 {
            decision.reason = "Budget exhausted".to_string();
            decision
                .constraint_violations
                .push(ConstraintViolation::BudgetExhausted);
        } else {
            decision.reason = "Below minimum viable allocation".to_string();
            decision
                .constraint_violations
                .push(ConstraintViolation::BelowMinimumViable);
        }
    }
}

fn allocate_resource(
    decision: &mut AllocationDecision,
    category: ResourceCategory,
    resource_type: &str,
    requested: f64,
    minimum_viable: Option<f64>,
    resource_remaining: &mut HashMap<(ResourceCategory, String), f64>,
    allow_partials: bool,
) {
    let remaining = resource_remaining
        .entry((category, resource_type.to_string()))
        .or_insert(0.0);

    if *remaining >= requested {
        decision.status = RequestStatus::Approved;
        decision.quantity_allocated = requested;
        decision.reason = "Fully allocated".to_string();
        *remaining -= requested;
    } else if allow_partials && minimum_viable.is_some_and(|minimum| *remaining >= minimum) {
        decision.status = RequestStatus::Partial;
        decision.quantity_allocated = *remaining;
        decision.reason = "Partially allocated - resource constraint".to_string();
        decision
            .constraint_violations
            .push(ConstraintViolation::ResourceLimited);
        *remaining = 0.0;
    } else {
        decision.status = RequestStatus::Denied;
        decision.quantity_allocated = 0.0;
        if *remaining <= 0.0 {
            decision.reason = "Resource pool exhausted".to_string();
            decision
                .constraint_violations
                .push(ConstraintViolation::ResourceExhausted);
        } else {
            decision.reason = "Below minimum viable quantity".to_string();
            decision
                .constraint_violations
                .push(ConstraintViolation::BelowMinimumViable);
        }
    }
}

fn summarize(cycle: &AllocationCycle, decisions: &[AllocationDecision]) -> RunSummary {
    let mut approved = 0;
    let mut partial = 0;
    let mut deferred = 0;
    let mut denied = 0;
    let mut total_allocated = 0.0;

    for decision in decisions {
        match decision.status {
            RequestStatus::Approved => approved += 1,
            RequestStatus::Partial => partial += 1,
            RequestStatus::Deferred => deferred += 1,
            RequestStatus::Denied => denied += 1,
            RequestStatus::Pending => {}
        }
        total_allocated += decision.amount_allocated;
    }

    let budget_capacity: f64 = cycle
        .budget_pools
        .iter()
        .map(|pool| pool.total_amount)
        .sum();
    let budget_utilization = if budget_capacity > 0.0 {
        total_allocated / budget_capacity
    } else {
        0.0
    };

    RunSummary {
        total_requests: decisions.len(),
        approved,
        partial,
        deferred,
        denied,
        total_allocated,
        budget_utilization,
    }
}
