use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::{AuthUser, JsonBody};
use crate::marketplace::input::TransactionInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::MarketplaceService;

pub(crate) async fn create_transaction_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    JsonBody(input): JsonBody<TransactionInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.record_transaction(&actor, input) {
        Ok(transaction) => {
            let payload = json!({
                "message": "Transaction created successfully",
                "transaction": transaction,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn transaction_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(transaction_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.transaction(&actor, &transaction_id) {
        Ok(transaction) => Json(json!({ "transaction": transaction })).into_response(),
        Err(err) => err.into_response(),
    }
}
