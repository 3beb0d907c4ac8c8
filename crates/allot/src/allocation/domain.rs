use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for allocation cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub String);

/// Identifier wrapper for allocation requests. Ids are zero-padded and
/// monotonic, so ordering by id reproduces submission order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Identifier wrapper for allocation runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

/// Kind of capacity a pool holds and a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceCategory {
    Money,
    Personnel,
    Vehicles,
    Equipment,
    Hours,
    Training,
    Travel,
}

impl ResourceCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ResourceCategory::Money => "MONEY",
            ResourceCategory::Personnel => "PERSONNEL",
            ResourceCategory::Vehicles => "VEHICLES",
            ResourceCategory::Equipment => "EQUIPMENT",
            ResourceCategory::Hours => "HOURS",
            ResourceCategory::Training => "TRAINING",
            ResourceCategory::Travel => "TRAVEL",
        }
    }
}

/// Declared blast radius if a request goes unfunded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ImpactLevel::Low => "LOW",
            ImpactLevel::Medium => "MEDIUM",
            ImpactLevel::High => "HIGH",
            ImpactLevel::Critical => "CRITICAL",
        }
    }
}

/// Risk class mitigated by funding the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Operational,
    Safety,
    Legal,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Operational => "OPERATIONAL",
            RiskLevel::Safety => "SAFETY",
            RiskLevel::Legal => "LEGAL",
        }
    }
}

/// Outcome of a request within a run, also mirrored back onto the stored
/// request after the latest completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Partial,
    Deferred,
    Denied,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Partial => "PARTIAL",
            RequestStatus::Deferred => "DEFERRED",
            RequestStatus::Denied => "DENIED",
        }
    }
}

/// Lifecycle of an allocation cycle record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    #[default]
    Draft,
    Active,
    Closed,
    Archived,
}

impl CycleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CycleStatus::Draft => "DRAFT",
            CycleStatus::Active => "ACTIVE",
            CycleStatus::Closed => "CLOSED",
            CycleStatus::Archived => "ARCHIVED",
        }
    }
}

/// What a request asks for. Monetary asks draw on budget pools keyed by
/// category; every other ask draws on resource pools keyed by category plus
/// resource type.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestAsk {
    Money {
        amount: f64,
        minimum_viable: Option<f64>,
    },
    Resource {
        category: ResourceCategory,
        resource_type: String,
        quantity: f64,
        minimum_viable: Option<f64>,
    },
}

impl RequestAsk {
    pub fn category(&self) -> ResourceCategory {
        match self {
            RequestAsk::Money { .. } => ResourceCategory::Money,
            RequestAsk::Resource { category, .. } => *category,
        }
    }
}

/// A validated request competing for capacity within one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub id: RequestId,
    pub cycle_id: CycleId,
    pub title: String,
    pub description: Option<String>,
    pub justification: Option<String>,
    pub ask: RequestAsk,
    pub priority: u8,
    pub urgency_deadline: NaiveDate,
    pub impact: ImpactLevel,
    pub risk: RiskLevel,
    pub strategic: u8,
    pub dependencies: Vec<RequestId>,
    pub status: RequestStatus,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl AllocationRequest {
    pub fn to_view(&self) -> RequestView {
        let (amount_requested, minimum_viable_allocation, quantity_requested, minimum_viable_quantity, resource_type) =
            match &self.ask {
                RequestAsk::Money {
                    amount,
                    minimum_viable,
                } => (Some(*amount), *minimum_viable, None, None, None),
                RequestAsk::Resource {
                    resource_type,
                    quantity,
                    minimum_viable,
                    ..
                } => (
                    None,
                    None,
                    Some(*quantity),
                    *minimum_viable,
                    Some(resource_type.clone()),
                ),
            };

        RequestView {
            id: self.id.clone(),
            cycle_id: self.cycle_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            justification: self.justification.clone(),
            category: self.ask.category(),
            resource_type,
            amount_requested,
            minimum_viable_allocation,
            quantity_requested,
            minimum_viable_quantity,
            priority: self.priority,
            urgency_deadline: self.urgency_deadline,
            impact: self.impact,
            risk: self.risk,
            strategic: self.strategic,
            dependencies: self.dependencies.clone(),
            status: self.status,
            score: self.score,
            created_at: self.created_at,
        }
    }
}

/// Wire shape of a stored request, flattened back into the nullable
/// amount/quantity columns clients expect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: RequestId,
    pub cycle_id: CycleId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub category: ResourceCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_requested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_viable_allocation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_requested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_viable_quantity: Option<f64>,
    pub priority: u8,
    pub urgency_deadline: NaiveDate,
    pub impact: ImpactLevel,
    pub risk: RiskLevel,
    pub strategic: u8,
    pub dependencies: Vec<RequestId>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Monetary capacity for one category within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPool {
    pub category: ResourceCategory,
    pub total_amount: f64,
    #[serde(default)]
    pub allocated_amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl BudgetPool {
    pub fn remaining_amount(&self) -> f64 {
        self.total_amount - self.allocated_amount
    }
}

/// Non-monetary capacity for one (category, resource type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePool {
    pub category: ResourceCategory,
    pub resource_type: String,
    pub total_quantity: f64,
    #[serde(default)]
    pub allocated_quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub exclusive: bool,
}

impl ResourcePool {
    pub fn remaining_quantity(&self) -> f64 {
        self.total_quantity - self.allocated_quantity
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_unit() -> String {
    "COUNT".to_string()
}

/// A planning window with the pools requests compete for. Requests are stored
/// separately and joined by cycle id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCycle {
    pub id: CycleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget_pools: Vec<BudgetPool>,
    pub resource_pools: Vec<ResourcePool>,
    pub allow_partial_allocations: bool,
    pub created_at: DateTime<Utc>,
}

/// Client payload for creating a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSubmission {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget_pools: Vec<BudgetPool>,
    #[serde(default)]
    pub resource_pools: Vec<ResourcePool>,
    #[serde(default)]
    pub allow_partial_allocations: Option<bool>,
}

/// Client payload for creating a request within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSubmission {
    pub cycle_id: CycleId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
    pub category: ResourceCategory,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub amount_requested: Option<f64>,
    #[serde(default)]
    pub quantity_requested: Option<f64>,
    #[serde(default)]
    pub minimum_viable_allocation: Option<f64>,
    #[serde(default)]
    pub minimum_viable_quantity: Option<f64>,
    #[serde(default = "default_factor")]
    pub priority: u8,
    pub urgency_deadline: NaiveDate,
    #[serde(default)]
    pub impact: ImpactLevel,
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default = "default_factor")]
    pub strategic: u8,
    #[serde(default)]
    pub dependencies: Vec<RequestId>,
}

fn default_factor() -> u8 {
    3
}
