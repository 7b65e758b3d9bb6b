use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::{AuthUser, ListingPayload};
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::MarketplaceService;

pub(crate) async fn create_listing_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    payload: ListingPayload,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.create_listing(&actor, payload.input, &payload.photos) {
        Ok(listing) => {
            let payload = json!({
                "message": "Listing created successfully",
                "listing": listing,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approved_listings_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(_actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.approved_listings() {
        Ok(listings) => Json(json!({ "listings": listings })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn listing_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(_actor): AuthUser,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.view_listing(&listing_id) {
        Ok(listing) => Json(json!({ "listing": listing })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn my_listings_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.my_listings(&actor) {
        Ok(listings) => Json(json!({ "listings": listings })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_listing_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(listing_id): Path<String>,
    payload: ListingPayload,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.update_listing(&actor, &listing_id, payload.input, &payload.photos) {
        Ok(listing) => Json(json!({
            "message": "Listing updated successfully",
            "listing": listing,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_listing_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.delete_listing(&actor, &listing_id) {
        Ok(()) => Json(json!({ "message": "Listing deleted successfully" })).into_response(),
        Err(err) => err.into_response(),
    }
}
