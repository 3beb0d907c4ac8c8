use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{
    AllocationRequest, CycleId, CycleStatus, CycleSubmission, RequestId, RequestStatus,
    RequestSubmission, RequestView, ResourceCategory, RunId,
};
use super::run::{AllocationRun, RunStatus, RunTrigger};
use super::service::{AllocationService, AllocationServiceError};
use super::store::{CycleStore, RunStore, StoreError};

const DEFAULT_PAGE_SIZE: usize = 20;

/// Router builder exposing the allocation HTTP surface.
pub fn allocation_router<C, R>(service: Arc<AllocationService<C, R>>) -> Router
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/cycles",
            post(create_cycle_handler::<C, R>).get(list_cycles_handler::<C, R>),
        )
        .route("/api/v1/cycles/:cycle_id", get(get_cycle_handler::<C, R>))
        .route(
            "/api/v1/requests",
            post(create_request_handler::<C, R>).get(list_requests_handler::<C, R>),
        )
        .route(
            "/api/v1/requests/:request_id",
            get(get_request_handler::<C, R>),
        )
        .route(
            "/api/v1/runs",
            post(start_run_handler::<C, R>).get(list_runs_handler::<C, R>),
        )
        .route("/api/v1/runs/:run_id", get(get_run_handler::<C, R>))
        .with_state(service)
}

/// Spring-style page envelope for request listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

fn paginate<T>(items: Vec<T>, page: usize, size: usize) -> PageView<T> {
    let size = size.max(1);
    let total_elements = items.len();
    let total_pages = total_elements.div_ceil(size);
    let content = items.into_iter().skip(page * size).take(size).collect();

    PageView {
        content,
        page,
        size,
        total_elements,
        total_pages,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CycleListQuery {
    status: Option<CycleStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestListQuery {
    cycle_id: CycleId,
    status: Option<RequestStatus>,
    category: Option<ResourceCategory>,
    page: Option<usize>,
    size: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunListQuery {
    cycle_id: Option<CycleId>,
    status: Option<RunStatus>,
}

pub(crate) async fn create_cycle_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    axum::Json(submission): axum::Json<CycleSubmission>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.create_cycle(submission) {
        Ok(cycle) => (StatusCode::CREATED, axum::Json(cycle)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_cycle_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Path(cycle_id): Path<String>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.get_cycle(&CycleId(cycle_id)) {
        Ok(cycle) => (StatusCode::OK, axum::Json(cycle)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_cycles_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Query(query): Query<CycleListQuery>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.list_cycles(query.status) {
        Ok(cycles) => (StatusCode::OK, axum::Json(cycles)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_request_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    axum::Json(submission): axum::Json<RequestSubmission>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.create_request(submission) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_request_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Path(request_id): Path<String>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.get_request(&RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_requests_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Query(query): Query<RequestListQuery>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);

    match service.list_requests(&query.cycle_id, query.status, query.category) {
        Ok(requests) => {
            let views: Vec<RequestView> =
                requests.iter().map(AllocationRequest::to_view).collect();
            (StatusCode::OK, axum::Json(paginate(views, page, size))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_run_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    axum::Json(trigger): axum::Json<RunTrigger>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.start_run(trigger) {
        Ok(run) => {
            let payload = json!({
                "runId": run.id,
                "status": RunStatus::Running,
                "message": format!(
                    "Allocation engine started. Poll /runs/{} for results.",
                    run.id.0
                ),
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_run_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Path(run_id): Path<String>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.get_run(&RunId(run_id)) {
        Ok(run) => (StatusCode::OK, axum::Json(run_payload(&run))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_runs_handler<C, R>(
    State(service): State<Arc<AllocationService<C, R>>>,
    Query(query): Query<RunListQuery>,
) -> Response
where
    C: CycleStore + 'static,
    R: RunStore + 'static,
{
    match service.list_runs(query.cycle_id.as_ref(), query.status) {
        Ok(runs) => {
            let entries: Vec<Value> = runs.iter().map(run_list_entry).collect();
            (StatusCode::OK, axum::Json(entries)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Poll payload for a single run. Every status carries the identity triple;
/// the rest of the body depends on where the run is in its lifecycle.
fn run_payload(run: &AllocationRun) -> Value {
    let mut payload = json!({
        "runId": run.id,
        "cycleId": run.cycle_id,
        "status": run.status,
    });

    let extra = match run.status {
        RunStatus::Pending => json!({}),
        RunStatus::Running => json!({
            "progress": run.progress,
            "currentPhase": run.current_phase,
        }),
        RunStatus::Completed => json!({
            "completedAt": run.completed_at,
            "executionTimeMs": run.execution_time_ms,
            "summary": run.summary,
            "results": run.decisions,
        }),
        RunStatus::Failed => json!({
            "errorMessage": run.error_message,
        }),
    };

    if let (Value::Object(payload), Value::Object(extra)) = (&mut payload, extra) {
        payload.extend(extra);
    }
    payload
}

fn run_list_entry(run: &AllocationRun) -> Value {
    json!({
        "runId": run.id,
        "cycleId": run.cycle_id,
        "status": run.status,
        "engineVersion": run.engine_version,
        "progress": run.progress,
        "createdAt": run.created_at,
        "startedAt": run.started_at,
        "completedAt": run.completed_at,
    })
}

fn error_response(error: AllocationServiceError) -> Response {
    let status = match &error {
        AllocationServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AllocationServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        AllocationServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        AllocationServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
