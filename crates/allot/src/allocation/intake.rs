use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    AllocationCycle, AllocationRequest, CycleId, CycleStatus, CycleSubmission, RequestAsk,
    RequestId, RequestStatus, RequestSubmission, ResourceCategory,
};

/// Validation errors raised while turning client submissions into domain
/// records.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("cycle name must not be blank")]
    BlankName,
    #[error("cycle window ends {end} before it starts {start}")]
    WindowEndsBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("pool capacity must not be negative, found {found}")]
    NegativePoolCapacity { found: f64 },
    #[error("resource pools must name a resourceType")]
    BlankPoolResourceType,
    #[error("request title must not be blank")]
    BlankTitle,
    #[error("MONEY requests must carry amountRequested")]
    MissingAmount,
    #[error("amountRequested must be positive, found {found}")]
    NonPositiveAmount { found: f64 },
    #[error("MONEY requests must not name a resourceType")]
    UnexpectedResourceType,
    #[error("{category:?} requests must name a resourceType")]
    MissingResourceType { category: ResourceCategory },
    #[error("{category:?} requests must carry quantityRequested")]
    MissingQuantity { category: ResourceCategory },
    #[error("quantityRequested must be positive, found {found}")]
    NonPositiveQuantity { found: f64 },
    #[error("minimum viable values must be positive, found {found}")]
    NonPositiveMinimum { found: f64 },
    #[error("minimum viable {minimum} exceeds the requested {requested}")]
    MinimumExceedsRequested { minimum: f64, requested: f64 },
}

/// Validate a cycle submission and mint the stored record.
pub fn cycle_from_submission(
    id: CycleId,
    now: DateTime<Utc>,
    submission: CycleSubmission,
) -> Result<AllocationCycle, IntakeViolation> {
    if submission.name.trim().is_empty() {
        return Err(IntakeViolation::BlankName);
    }

    if submission.end_date < submission.start_date {
        return Err(IntakeViolation::WindowEndsBeforeStart {
            start: submission.start_date,
            end: submission.end_date,
        });
    }

    for pool in &submission.budget_pools {
        if pool.total_amount < 0.0 {
            return Err(IntakeViolation::NegativePoolCapacity {
                found: pool.total_amount,
            });
        }
    }

    for pool in &submission.resource_pools {
        if pool.total_quantity < 0.0 {
            return Err(IntakeViolation::NegativePoolCapacity {
                found: pool.total_quantity,
            });
        }
        if pool.resource_type.trim().is_empty() {
            return Err(IntakeViolation::BlankPoolResourceType);
        }
    }

    Ok(AllocationCycle {
        id,
        name: submission.name.trim().to_string(),
        description: submission.description,
        status: CycleStatus::Draft,
        start_date: submission.start_date,
        end_date: submission.end_date,
        budget_pools: submission.budget_pools,
        resource_pools: submission.resource_pools,
        allow_partial_allocations: submission.allow_partial_allocations.unwrap_or(true),
        created_at: now,
    })
}

/// Validate a request submission and mint the stored record. Monetary and
/// non-monetary asks carry mutually exclusive fields on the wire; this is
/// where that split is enforced.
pub fn request_from_submission(
    id: RequestId,
    now: DateTime<Utc>,
    submission: RequestSubmission,
) -> Result<AllocationRequest, IntakeViolation> {
    if submission.title.trim().is_empty() {
        return Err(IntakeViolation::BlankTitle);
    }

    let ask = match submission.category {
        ResourceCategory::Money => {
            if submission.resource_type.is_some() {
                return Err(IntakeViolation::UnexpectedResourceType);
            }
            let amount = submission
                .amount_requested
                .ok_or(IntakeViolation::MissingAmount)?;
            if amount <= 0.0 {
                return Err(IntakeViolation::NonPositiveAmount { found: amount });
            }
            let minimum_viable = checked_minimum(submission.minimum_viable_allocation, amount)?;
            RequestAsk::Money {
                amount,
                minimum_viable,
            }
        }
        category => {
            let resource_type = submission
                .resource_type
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(IntakeViolation::MissingResourceType { category })?;
            let quantity = submission
                .quantity_requested
                .ok_or(IntakeViolation::MissingQuantity { category })?;
            if quantity <= 0.0 {
                return Err(IntakeViolation::NonPositiveQuantity { found: quantity });
            }
            let minimum_viable = checked_minimum(submission.minimum_viable_quantity, quantity)?;
            RequestAsk::Resource {
                category,
                resource_type,
                quantity,
                minimum_viable,
            }
        }
    };

    Ok(AllocationRequest {
        id,
        cycle_id: submission.cycle_id,
        title: submission.title.trim().to_string(),
        description: submission.description,
        justification: submission.justification,
        ask,
        priority: submission.priority,
        urgency_deadline: submission.urgency_deadline,
        impact: submission.impact,
        risk: submission.risk,
        strategic: submission.strategic,
        dependencies: submission.dependencies,
        status: RequestStatus::Pending,
        score: None,
        created_at: now,
    })
}

fn checked_minimum(minimum: Option<f64>, requested: f64) -> Result<Option<f64>, IntakeViolation> {
    let Some(minimum) = minimum else {
        return Ok(None);
    };
    if minimum <= 0.0 {
        return Err(IntakeViolation::NonPositiveMinimum { found: minimum });
    }
    if minimum > requested {
        return Err(IntakeViolation::MinimumExceedsRequested {
            minimum,
            requested,
        });
    }
    Ok(Some(minimum))
}
