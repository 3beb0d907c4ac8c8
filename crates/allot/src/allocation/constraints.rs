use std::collections::{HashMap, HashSet};

use super::domain::{AllocationCycle, AllocationRequest, RequestId, RequestStatus, ResourceCategory};
use super::run::AllocationDecision;

/// Problems that make a cycle unrunnable, caught before any scoring happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleValidationError {
    #[error("dependency cycle detected: {}", render_cycle(.path))]
    DependencyCycle { path: Vec<RequestId> },
    #[error("budget pools for {category:?} mix currencies {expected} and {found}")]
    CurrencyConflict {
        category: ResourceCategory,
        expected: String,
        found: String,
    },
    #[error("resource pools for {category:?}/{resource_type} mix units {expected} and {found}")]
    UnitConflict {
        category: ResourceCategory,
        resource_type: String,
        expected: String,
        found: String,
    },
}

fn render_cycle(path: &[RequestId]) -> String {
    path.iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Pure predicates consulted during a run, plus up-front cycle validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintEngine;

impl ConstraintEngine {
    /// A request is eligible only when every dependency already holds a fully
    /// approved decision from earlier in the same pass. Partial awards do not
    /// count, and a dependency ranked later has no decision yet.
    pub fn dependencies_satisfied(
        &self,
        request: &AllocationRequest,
        decided: &HashMap<RequestId, AllocationDecision>,
    ) -> bool {
        request.dependencies.iter().all(|dependency_id| {
            decided
                .get(dependency_id)
                .is_some_and(|decision| decision.status == RequestStatus::Approved)
        })
    }

    /// Reject cycles whose pools disagree on currency or unit, and request
    /// sets whose dependency graph loops. Dependency ids that resolve to no
    /// request are left alone here; they simply defer at allocation time.
    pub fn validate_cycle(
        &self,
        cycle: &AllocationCycle,
        requests: &[AllocationRequest],
    ) -> Result<(), CycleValidationError> {
        check_pool_agreement(cycle)?;
        check_dependency_graph(requests)
    }
}

fn check_pool_agreement(cycle: &AllocationCycle) -> Result<(), CycleValidationError> {
    let mut currencies: HashMap<ResourceCategory, &str> = HashMap::new();
    for pool in &cycle.budget_pools {
        if let Some(existing) = currencies.insert(pool.category, pool.currency.as_str()) {
            if existing != pool.currency {
                return Err(CycleValidationError::CurrencyConflict {
                    category: pool.category,
                    expected: existing.to_string(),
                    found: pool.currency.clone(),
                });
            }
        }
    }

    let mut units: HashMap<(ResourceCategory, &str), &str> = HashMap::new();
    for pool in &cycle.resource_pools {
        if let Some(existing) =
            units.insert((pool.category, pool.resource_type.as_str()), pool.unit.as_str())
        {
            if existing != pool.unit {
                return Err(CycleValidationError::UnitConflict {
                    category: pool.category,
                    resource_type: pool.resource_type.clone(),
                    expected: existing.to_string(),
                    found: pool.unit.clone(),
                });
            }
        }
    }

    Ok(())
}

fn check_dependency_graph(requests: &[AllocationRequest]) -> Result<(), CycleValidationError> {
    let by_id: HashMap<&RequestId, &AllocationRequest> = requests
        .iter()
        .map(|request| (&request.id, request))
        .collect();

    let mut finished: HashSet<&RequestId> = HashSet::new();

    for root in requests {
        if finished.contains(&root.id) {
            continue;
        }

        let mut stack: Vec<(&AllocationRequest, usize)> = vec![(root, 0)];
        let mut on_path: Vec<&RequestId> = vec![&root.id];

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            if frame.1 >= current.dependencies.len() {
                finished.insert(&current.id);
                on_path.pop();
                stack.pop();
                continue;
            }

            let dependency_id = &current.dependencies[frame.1];
            frame.1 += 1;

            if finished.contains(dependency_id) {
                continue;
            }
            let Some(dependency) = by_id.get(dependency_id).copied() else {
                continue;
            };
            if let Some(position) = on_path.iter().position(|id| *id == dependency_id) {
                let mut path: Vec<RequestId> =
                    on_path[position..].iter().map(|id| (*id).clone()).collect();
                path.push(dependency_id.clone());
                return Err(CycleValidationError::DependencyCycle { path });
            }

            on_path.push(&dependency.id);
            stack.push((dependency, 0));
        }
    }

    Ok(())
}
