use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::{AuthUser, JsonBody};
use crate::marketplace::input::MessageInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::MarketplaceService;

// Confirmations carry the text under `message` and the document under `data`.

pub(crate) async fn send_message_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    JsonBody(input): JsonBody<MessageInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.send_message(&actor, input) {
        Ok(message) => {
            let payload = json!({
                "message": "Message sent successfully",
                "data": message,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn listing_messages_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(_actor): AuthUser,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.listing_messages(&listing_id) {
        Ok(messages) => Json(json!({ "messages": messages })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn my_messages_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.my_messages(&actor) {
        Ok(messages) => Json(json!({ "messages": messages })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn mark_read_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(message_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.mark_message_read(&actor, &message_id) {
        Ok(message) => Json(json!({
            "message": "Message marked as read",
            "data": message,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
