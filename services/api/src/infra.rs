use axum::http::{header, HeaderValue, Method};
use farm_konnect::config::{AppConfig, ServerConfig, StorageConfig};
use farm_konnect::error::AppError;
use farm_konnect::marketplace::{
    DiskPhotoStorage, DocumentStore, MarketplacePolicy, MarketplaceService, TokenIssuer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub(crate) type AppService = MarketplaceService<DocumentStore, DiskPhotoStorage>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store, backed by the snapshot file when one is configured.
pub(crate) fn open_store(config: &StorageConfig) -> Result<DocumentStore, AppError> {
    match &config.data_file {
        Some(path) => {
            let store = DocumentStore::open(path)?;
            info!(path = %path.display(), "document store loaded from snapshot");
            Ok(store)
        }
        None => Ok(DocumentStore::new()),
    }
}

pub(crate) fn build_service(
    config: &AppConfig,
    store: Arc<DocumentStore>,
) -> Result<AppService, AppError> {
    let photos = DiskPhotoStorage::new(&config.uploads.directory)?;
    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_days);
    let policy = MarketplacePolicy::from_config(&config.auth, &config.uploads);
    Ok(MarketplaceService::new(
        store,
        Arc::new(photos),
        tokens,
        policy,
    ))
}

/// Browser access policy. A configured origin may send credentials; without one any
/// origin is allowed.
pub(crate) fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE];

    let origin = config
        .cors_origin
        .as_deref()
        .and_then(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS_ORIGIN");
                None
            }
        });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers),
    }
}
