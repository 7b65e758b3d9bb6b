//! Request extractors shared by the marketplace handlers. Every rejection is a
//! [`ServiceError`] so clients always receive the `{"message": ...}` body.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::marketplace::domain::User;
use crate::marketplace::input::ListingInput;
use crate::marketplace::photos::{PhotoStorage, PhotoUpload};
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::service::{MarketplaceService, ServiceError, NO_TOKEN};

/// Multipart field carrying listing photos.
const PHOTO_FIELD: &str = "photos";

/// Account resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S, P> FromRequestParts<Arc<MarketplaceService<S, P>>> for AuthUser
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<MarketplaceService<S, P>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ServiceError::Unauthorized(NO_TOKEN))?;
        service.authenticate(token).map(AuthUser)
    }
}

/// JSON body whose rejections surface as `400` validation errors.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, St> FromRequest<St> for JsonBody<T>
where
    T: DeserializeOwned,
    St: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
        }
    }
}

/// Listing fields plus any uploaded photos. Accepts `multipart/form-data` as sent by
/// the listing form, or a plain JSON body without photos.
#[derive(Debug, Clone, Default)]
pub struct ListingPayload {
    pub input: ListingInput,
    pub photos: Vec<PhotoUpload>,
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map_or(false, |mime| {
            mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA
        })
}

#[axum::async_trait]
impl<St> FromRequest<St> for ListingPayload
where
    St: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let JsonBody(input) = JsonBody::<ListingInput>::from_request(req, state).await?;
            return Ok(Self {
                input,
                photos: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::Validation(rejection.body_text()))?;
        let mut payload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ServiceError::Validation(err.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == PHOTO_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ServiceError::Validation(err.body_text()))?;
                payload.photos.push(PhotoUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ServiceError::Validation(err.body_text()))?;
                payload.input.set_form_field(&name, value);
            }
        }

        Ok(payload)
    }
}
