use allot::allocation::domain::{
    AllocationCycle, AllocationRequest, BudgetPool, CycleId, CycleStatus, ImpactLevel, RequestAsk,
    RequestId, RequestStatus, ResourceCategory, ResourcePool, RiskLevel,
};
use allot::allocation::run::{AllocationDecision, RunSummary};
use allot::allocation::{AllocationEngine, NullProgress, RunOptions};
use allot::error::AppError;
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for urgency scoring (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) evaluation_date: Option<NaiveDate>,
    /// Disable partial awards even where a minimum viable amount would fit.
    #[arg(long)]
    pub(crate) no_partials: bool,
    /// Print the run outcome as pretty JSON instead of the narrative rendering.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport<'a> {
    cycle: &'a AllocationCycle,
    evaluation_date: NaiveDate,
    allow_partial_allocations: bool,
    summary: &'a RunSummary,
    decisions: &'a [AllocationDecision],
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        evaluation_date,
        no_partials,
        json,
    } = args;

    let evaluation_date = evaluation_date.unwrap_or_else(|| Local::now().date_naive());
    let options = RunOptions {
        allow_partial_allocations: !no_partials,
        evaluation_date,
    };
    let (cycle, requests) = demo_cycle(evaluation_date);

    let engine = AllocationEngine::default();
    let outcome = match engine.execute(&cycle, &requests, &options, &NullProgress) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("Allocation pass failed: {}", err);
            return Ok(());
        }
    };

    if json {
        let report = DemoReport {
            cycle: &cycle,
            evaluation_date,
            allow_partial_allocations: options.allow_partial_allocations,
            summary: &outcome.summary,
            decisions: &outcome.decisions,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("Demo payload unavailable: {}", err),
        }
        return Ok(());
    }

    println!("Allocation engine demo");
    println!("Cycle: {} ({} -> {})", cycle.name, cycle.start_date, cycle.end_date);
    println!(
        "Evaluation date: {} | partial awards {}",
        evaluation_date,
        if options.allow_partial_allocations {
            "enabled"
        } else {
            "disabled"
        }
    );

    println!("\nCapacity");
    for pool in &cycle.budget_pools {
        println!(
            "- {} budget: {:.0} {}",
            pool.category.label(),
            pool.total_amount,
            pool.currency
        );
    }
    for pool in &cycle.resource_pools {
        println!(
            "- {} / {}: {:.0} {}",
            pool.category.label(),
            pool.resource_type,
            pool.total_quantity,
            pool.unit
        );
    }

    println!("\nDecisions in rank order");
    for decision in &outcome.decisions {
        render_decision(decision);
    }

    let summary = &outcome.summary;
    println!("\nRun summary");
    println!(
        "- {} requests: {} approved, {} partial, {} deferred, {} denied",
        summary.total_requests, summary.approved, summary.partial, summary.deferred, summary.denied
    );
    println!(
        "- {:.0} allocated | {:.0}% of budget capacity",
        summary.total_allocated,
        summary.budget_utilization * 100.0
    );

    Ok(())
}

fn render_decision(decision: &AllocationDecision) {
    println!(
        "\n#{} {} [{}] score {:.2}",
        decision.rank,
        decision.request_title,
        decision.status.label(),
        decision.score
    );
    if let Some(amount) = decision.amount_requested {
        println!(
            "   requested {:.0} -> allocated {:.0}",
            amount, decision.amount_allocated
        );
    }
    if let Some(quantity) = decision.quantity_requested {
        println!(
            "   requested {:.0} units -> allocated {:.0}",
            quantity, decision.quantity_allocated
        );
    }

    match &decision.explanation {
        Some(explanation) => {
            println!("   {}", explanation.narrative);
            let breakdown = &explanation.score_breakdown;
            println!(
                "   factors: priority {:.2} + urgency {:.2} + impact {:.2} + risk {:.2} + strategic {:.2}",
                breakdown.priority.contribution,
                breakdown.urgency.contribution,
                breakdown.impact.contribution,
                breakdown.risk.contribution,
                breakdown.strategic.contribution
            );
            if let Some(compared) = &explanation.compared_to {
                println!(
                    "   edged out {} by {:.2} points (score {:.2})",
                    compared.request_title, compared.score_difference, compared.score
                );
            }
        }
        None => println!("   {}", decision.reason),
    }

    if !decision.constraint_violations.is_empty() {
        println!("   constraints: {:?}", decision.constraint_violations);
    }
}

/// A canned cycle sized so one pass exercises every decision path: full
/// awards, a budget-limited partial, a resource-limited partial, exhausted
/// pools, and a deferral behind a partially funded dependency.
fn demo_cycle(evaluation_date: NaiveDate) -> (AllocationCycle, Vec<AllocationRequest>) {
    let cycle = AllocationCycle {
        id: CycleId("cycle-fy26".to_string()),
        name: "FY26 field operations readiness".to_string(),
        description: Some(
            "Quarterly capital and equipment asks for the field operations group".to_string(),
        ),
        status: CycleStatus::Active,
        start_date: evaluation_date,
        end_date: evaluation_date + Duration::days(120),
        budget_pools: vec![BudgetPool {
            category: ResourceCategory::Money,
            total_amount: 50_000.0,
            allocated_amount: 0.0,
            currency: "USD".to_string(),
        }],
        resource_pools: vec![
            ResourcePool {
                category: ResourceCategory::Vehicles,
                resource_type: "pickup truck".to_string(),
                total_quantity: 2.0,
                allocated_quantity: 0.0,
                unit: "VEHICLE".to_string(),
                exclusive: false,
            },
            ResourcePool {
                category: ResourceCategory::Training,
                resource_type: "defensive driving seat".to_string(),
                total_quantity: 12.0,
                allocated_quantity: 0.0,
                unit: "SEAT".to_string(),
                exclusive: false,
            },
        ],
        allow_partial_allocations: true,
        created_at: Utc::now(),
    };

    let radios = AllocationRequest {
        justification: Some(
            "Current radios drop out of encrypted mode during storm callouts".to_string(),
        ),
        priority: 5,
        impact: ImpactLevel::High,
        risk: RiskLevel::Safety,
        strategic: 4,
        ..demo_request(
            &cycle.id,
            "req-radios",
            "Replace aging patrol radios",
            RequestAsk::Money {
                amount: 18_000.0,
                minimum_viable: Some(12_000.0),
            },
            20,
            evaluation_date,
        )
    };

    let software = AllocationRequest {
        priority: 4,
        impact: ImpactLevel::Critical,
        risk: RiskLevel::Legal,
        strategic: 5,
        ..demo_request(
            &cycle.id,
            "req-command-software",
            "Mobile command software licenses",
            RequestAsk::Money {
                amount: 30_000.0,
                minimum_viable: Some(20_000.0),
            },
            30,
            evaluation_date,
        )
    };

    let labor = AllocationRequest {
        risk: RiskLevel::Safety,
        dependencies: vec![RequestId("req-radios".to_string())],
        ..demo_request(
            &cycle.id,
            "req-install-labor",
            "Radio installation labor",
            RequestAsk::Money {
                amount: 6_000.0,
                minimum_viable: Some(2_000.0),
            },
            20,
            evaluation_date,
        )
    };

    let truck_north = AllocationRequest {
        priority: 4,
        impact: ImpactLevel::High,
        ..demo_request(
            &cycle.id,
            "req-truck-north",
            "North district pickup truck",
            RequestAsk::Resource {
                category: ResourceCategory::Vehicles,
                resource_type: "pickup truck".to_string(),
                quantity: 1.0,
                minimum_viable: None,
            },
            60,
            evaluation_date,
        )
    };

    let training = AllocationRequest {
        priority: 4,
        ..demo_request(
            &cycle.id,
            "req-driver-training",
            "Defensive driving certification",
            RequestAsk::Resource {
                category: ResourceCategory::Training,
                resource_type: "defensive driving seat".to_string(),
                quantity: 10.0,
                minimum_viable: Some(6.0),
            },
            45,
            evaluation_date,
        )
    };

    let encryption = AllocationRequest {
        dependencies: vec![RequestId("req-install-labor".to_string())],
        ..demo_request(
            &cycle.id,
            "req-encryption",
            "Encryption module refresh",
            RequestAsk::Money {
                amount: 3_000.0,
                minimum_viable: None,
            },
            40,
            evaluation_date,
        )
    };

    let spare_parts = AllocationRequest {
        description: Some("Restock the depot shelves ahead of winter".to_string()),
        ..demo_request(
            &cycle.id,
            "req-spare-parts",
            "Spare parts restock",
            RequestAsk::Money {
                amount: 14_000.0,
                minimum_viable: Some(5_000.0),
            },
            75,
            evaluation_date,
        )
    };

    let truck_south = AllocationRequest {
        risk: RiskLevel::Low,
        ..demo_request(
            &cycle.id,
            "req-truck-south",
            "South district pickup trucks",
            RequestAsk::Resource {
                category: ResourceCategory::Vehicles,
                resource_type: "pickup truck".to_string(),
                quantity: 2.0,
                minimum_viable: Some(1.0),
            },
            60,
            evaluation_date,
        )
    };

    let travel = AllocationRequest {
        priority: 2,
        impact: ImpactLevel::Low,
        risk: RiskLevel::Low,
        strategic: 2,
        ..demo_request(
            &cycle.id,
            "req-travel-block",
            "Regional conference travel block",
            RequestAsk::Money {
                amount: 9_000.0,
                minimum_viable: None,
            },
            90,
            evaluation_date,
        )
    };

    let requests = vec![
        radios,
        software,
        labor,
        truck_north,
        training,
        encryption,
        spare_parts,
        truck_south,
        travel,
    ];

    (cycle, requests)
}

fn demo_request(
    cycle_id: &CycleId,
    id: &str,
    title: &str,
    ask: RequestAsk,
    due_in_days: i64,
    evaluation_date: NaiveDate,
) -> AllocationRequest {
    AllocationRequest {
        id: RequestId(id.to_string()),
        cycle_id: cycle_id.clone(),
        title: title.to_string(),
        description: None,
        justification: None,
        ask,
        priority: 3,
        urgency_deadline: evaluation_date + Duration::days(due_in_days),
        impact: ImpactLevel::Medium,
        risk: RiskLevel::Operational,
        strategic: 3,
        dependencies: Vec::new(),
        status: RequestStatus::Pending,
        score: None,
        created_at: Utc::now(),
    }
}
