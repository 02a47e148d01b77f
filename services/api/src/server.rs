use crate::cli::ServeArgs;
use crate::demo;
use crate::infra::AppState;
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pulse_engine::config::AppConfig;
use pulse_engine::error::AppError;
use pulse_engine::store::InMemoryPulseStore;
use pulse_engine::{telemetry, PulseEngine};
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

    let store = Arc::new(InMemoryPulseStore::new());
    if args.seed_demo {
        demo::seed_demo_tenant(store.as_ref())?;
    }
    let engine = Arc::new(PulseEngine::with_concurrency(
        store,
        config.engine.recalc_concurrency,
    ));

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine,
    };

    let app = app_router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pulse scoring engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
