use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::{AuthUser, JsonBody};
use crate::marketplace::domain::ProfileUpdate;
use crate::marketplace::input::{LoginInput, RegisterInput};
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::MarketplaceService;
use crate::marketplace::views::UserView;

pub(crate) async fn register_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.register(input) {
        Ok(session) => {
            let payload = json!({
                "message": "User registered successfully",
                "token": session.token,
                "user": UserView::from(&session.user),
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn login_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.login(input) {
        Ok(session) => {
            let payload = json!({
                "message": "Login successful",
                "token": session.token,
                "user": UserView::from(&session.user),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn me_handler<S, P>(
    State(_service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(user): AuthUser,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    Json(json!({ "user": UserView::from(&user) })).into_response()
}

pub(crate) async fn update_profile_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(actor): AuthUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.update_profile(&actor, update) {
        Ok(user) => Json(json!({
            "message": "Profile updated successfully",
            "user": UserView::from(&user),
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn user_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    AuthUser(_actor): AuthUser,
    Path(user_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    match service.user(&user_id) {
        Ok(user) => Json(json!({ "user": UserView::from(&user) })).into_response(),
        Err(err) => err.into_response(),
    }
}
