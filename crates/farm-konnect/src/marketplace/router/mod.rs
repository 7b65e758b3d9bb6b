//! HTTP surface of the marketplace under `/api`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use super::photos::PhotoStorage;
use super::repository::MarketplaceStore;
use super::service::MarketplaceService;

mod accounts;
mod admin;
mod error;
pub mod extract;
mod listings;
mod messages;
mod transactions;

pub(crate) use accounts::*;
pub(crate) use admin::*;
pub(crate) use listings::*;
pub(crate) use messages::*;
pub(crate) use transactions::*;

/// Router builder exposing every marketplace endpoint.
pub fn marketplace_router<S, P>(service: Arc<MarketplaceService<S, P>>) -> Router
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    let body_limit = service.policy().body_limit();

    Router::new()
        .route("/api/auth/register", post(register_handler::<S, P>))
        .route("/api/auth/login", post(login_handler::<S, P>))
        .route("/api/auth/me", get(me_handler::<S, P>))
        .route("/api/users/profile", put(update_profile_handler::<S, P>))
        .route("/api/users/:user_id", get(user_handler::<S, P>))
        .route(
            "/api/listings",
            post(create_listing_handler::<S, P>).get(approved_listings_handler::<S, P>),
        )
        .route("/api/listings/my/all", get(my_listings_handler::<S, P>))
        .route(
            "/api/listings/:listing_id",
            get(listing_handler::<S, P>)
                .put(update_listing_handler::<S, P>)
                .delete(delete_listing_handler::<S, P>),
        )
        .route("/api/messages", post(send_message_handler::<S, P>))
        .route(
            "/api/messages/listing/:listing_id",
            get(listing_messages_handler::<S, P>),
        )
        .route("/api/messages/my/all", get(my_messages_handler::<S, P>))
        .route(
            "/api/messages/:message_id/read",
            put(mark_read_handler::<S, P>),
        )
        .route("/api/admin/users", get(admin_users_handler::<S, P>))
        .route(
            "/api/admin/users/:user_id/status",
            put(user_status_handler::<S, P>),
        )
        .route("/api/admin/listings", get(admin_listings_handler::<S, P>))
        .route(
            "/api/admin/listings/:listing_id/status",
            put(listing_status_handler::<S, P>),
        )
        .route("/api/admin/stats", get(stats_handler::<S, P>))
        .route(
            "/api/transactions",
            post(create_transaction_handler::<S, P>),
        )
        .route(
            "/api/transactions/:transaction_id",
            get(transaction_handler::<S, P>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}
