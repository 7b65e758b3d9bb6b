use crate::cli::ServeArgs;
use crate::infra::{build_service, cors_layer, open_store, AppState};
use crate::routes::with_operational_routes;
use crate::seed::seed_marketplace;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use farm_konnect::config::AppConfig;
use farm_konnect::error::AppError;
use farm_konnect::marketplace::{marketplace_router, photos::PUBLIC_PREFIX};
use farm_konnect::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
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

    let store = Arc::new(open_store(&config.storage)?);
    if args.seed {
        seed_marketplace(store.as_ref())?;
    }
    let service = Arc::new(build_service(&config, store)?);

    let app = with_operational_routes(marketplace_router(service))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&config.uploads.directory))
        .layer(Extension(app_state))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "farm konnect api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
