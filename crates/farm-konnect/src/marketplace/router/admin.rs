use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::{AuthUser, JsonBody};
use crate::marketplace::input::StatusInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::MarketplaceService;
use crate::marketplace::views::UserStatusView;

pub(crate) async fn admin_users_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.admin_users(&actor) {
        Ok(users) => Json(json!({ "users": users })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn user_status_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<String>,
    JsonBody(input): JsonBody<StatusInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.set_user_status(&actor, &user_id, input) {
        Ok(user) => Json(json!({
            "message": "User status updated successfully",
            "user": UserStatusView::from(&user),
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_listings_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.admin_listings(&actor) {
        Ok(listings) => Json(json!({ "listings": listings })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn listing_status_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(listing_id): Path<String>,
    JsonBody(input): JsonBody<StatusInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.set_listing_status(&actor, &listing_id, input) {
        Ok(listing) => Json(json!({
            "message": "Listing status updated successfully",
            "listing": listing,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn stats_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.platform_stats(&actor) {
        Ok(stats) => Json(json!({ "stats": stats })).into_response(),
        Err(err) => err.into_response(),
    }
}
