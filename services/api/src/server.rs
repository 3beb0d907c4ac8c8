use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCycleStore, InMemoryRunStore};
use crate::routes::with_allocation_routes;
use allot::allocation::{AllocationService, ScoringConfig};
use allot::config::AppConfig;
use allot::error::AppError;
use allot::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let cycles = Arc::new(InMemoryCycleStore::default());
    let runs = Arc::new(InMemoryRunStore::default());
    let scoring_config = ScoringConfig {
        weights: config.scoring_weights,
        ..ScoringConfig::default()
    };
    let allocation_service = Arc::new(AllocationService::new(cycles, runs, scoring_config));

    let app = with_allocation_routes(allocation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "allocation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
