//! Farmland leasing marketplace: accounts, listings, messages, and lease transactions.
//!
//! Documents live behind the repository traits so the service and router can be driven
//! against the in-process [`DocumentStore`] or any other backend.

pub mod credentials;
pub mod domain;
pub mod input;
pub mod memory;
pub mod photos;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use credentials::{hash_password, verify_password, CredentialError, TokenIssuer};
pub use domain::{
    LandType, Listing, ListingId, ListingStatus, Message, MessageId, Profile, ProfileUpdate,
    Transaction, TransactionId, TransactionStatus, User, UserId, UserRole, UserStatus,
};
pub use input::{
    ListingInput, LoginInput, MessageInput, RegisterInput, StatusInput, TransactionInput,
    ValidationError,
};
pub use memory::DocumentStore;
pub use photos::{DiskPhotoStorage, PhotoStorage, PhotoStorageError, PhotoUpload};
pub use repository::{
    ListingRepository, MarketplaceStore, MessageRepository, RepositoryError,
    TransactionRepository, UserRepository,
};
pub use router::marketplace_router;
pub use service::{AuthSession, MarketplacePolicy, MarketplaceService, ServiceError};
