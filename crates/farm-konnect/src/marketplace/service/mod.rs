use std::sync::Arc;

use tracing::warn;

use super::credentials::{CredentialError, TokenIssuer};
use super::domain::{ListingId, User, UserId, UserRole};
use super::input::ValidationError;
use super::photos::{PhotoStorage, PhotoStorageError, PhotoUpload};
use super::repository::{MarketplaceStore, RepositoryError};
use super::views::{ListingTitle, PartySummary};
use crate::config::{AuthConfig, UploadConfig};

mod accounts;
mod admin;
mod listings;
mod messages;
mod transactions;

pub use accounts::AuthSession;

pub(crate) const NO_TOKEN: &str = "Not authorized, no token";
pub(crate) const TOKEN_FAILED: &str = "Not authorized, token failed";
const USER_MISSING: &str = "Not authorized, user not found";

/// Knobs the service enforces on top of field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplacePolicy {
    pub allow_admin_signup: bool,
    pub max_photos: usize,
    pub max_photo_bytes: usize,
}

impl Default for MarketplacePolicy {
    fn default() -> Self {
        Self {
            allow_admin_signup: false,
            max_photos: 5,
            max_photo_bytes: 5 * 1024 * 1024,
        }
    }
}

impl MarketplacePolicy {
    pub fn from_config(auth: &AuthConfig, uploads: &UploadConfig) -> Self {
        Self {
            allow_admin_signup: auth.allow_admin_signup,
            max_photos: uploads.max_files,
            max_photo_bytes: uploads.max_file_bytes,
        }
    }

    /// Largest request body the listing endpoints need to accept.
    pub fn body_limit(&self) -> usize {
        self.max_photos
            .saturating_mul(self.max_photo_bytes)
            .saturating_add(1024 * 1024)
    }
}

/// Error raised by the marketplace service. The display text is what clients see.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Photos(#[from] PhotoStorageError),
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.0)
    }
}

/// Service composing the document store, photo storage, and token issuer.
///
/// Every operation that acts on behalf of a user takes the authenticated account as an
/// explicit `actor` argument.
pub struct MarketplaceService<S, P> {
    store: Arc<S>,
    photos: Arc<P>,
    tokens: TokenIssuer,
    policy: MarketplacePolicy,
}

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    pub fn new(
        store: Arc<S>,
        photos: Arc<P>,
        tokens: TokenIssuer,
        policy: MarketplacePolicy,
    ) -> Self {
        Self {
            store,
            photos,
            tokens,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &MarketplacePolicy {
        &self.policy
    }

    /// Resolve a bearer token to the account it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let user_id = self
            .tokens
            .verify(token)
            .map_err(|_| ServiceError::Unauthorized(TOKEN_FAILED))?;
        self.store
            .fetch_user(&user_id)?
            .ok_or(ServiceError::Unauthorized(USER_MISSING))
    }

    fn party(&self, id: &UserId) -> Result<Option<PartySummary>, ServiceError> {
        Ok(self.store.fetch_user(id)?.as_ref().map(PartySummary::of))
    }

    fn listing_title(&self, id: &ListingId) -> Result<Option<ListingTitle>, ServiceError> {
        Ok(self.store.fetch_listing(id)?.as_ref().map(ListingTitle::from))
    }

    /// Check and persist uploads, returning their public paths. Nothing is written unless
    /// every upload passes, and a failed write removes the photos already stored.
    fn store_photos(&self, uploads: &[PhotoUpload]) -> Result<Vec<String>, ServiceError> {
        if uploads.len() > self.policy.max_photos {
            return Err(ServiceError::Validation(format!(
                "Too many photos: at most {} per listing request",
                self.policy.max_photos
            )));
        }
        for upload in uploads {
            if !upload.is_image() {
                return Err(ServiceError::Validation(
                    "Only image files are allowed".to_string(),
                ));
            }
            if upload.bytes.len() > self.policy.max_photo_bytes {
                return Err(ServiceError::Validation(format!(
                    "Photo exceeds the {} byte limit",
                    self.policy.max_photo_bytes
                )));
            }
        }

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.photos.store(upload) {
                Ok(path) => stored.push(path),
                Err(err) => return Err(self.discard_photos(&stored, err.into())),
            }
        }
        Ok(stored)
    }

    /// Remove photos written for a request that failed, handing back its error.
    fn discard_photos(&self, paths: &[String], cause: ServiceError) -> ServiceError {
        for path in paths {
            if let Err(err) = self.photos.remove(path) {
                warn!(path = %path, error = %err, "failed to discard orphaned photo");
            }
        }
        cause
    }
}

pub(crate) fn require_role(actor: &User, role: UserRole) -> Result<(), ServiceError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            actor.role
        )))
    }
}
