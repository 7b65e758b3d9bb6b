use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::marketplace::credentials::{hash_password, TokenIssuer};
use crate::marketplace::domain::{
    LandType, Listing, ListingId, ListingStatus, Message, MessageId, Profile, Transaction,
    TransactionId, User, UserId, UserRole, UserStatus,
};
use crate::marketplace::input::{ListingInput, NumericField};
use crate::marketplace::memory::DocumentStore;
use crate::marketplace::photos::{PhotoStorage, PhotoStorageError, PhotoUpload};
use crate::marketplace::repository::{
    ListingFilter, ListingRepository, MessageFilter, MessageRepository, RepositoryError,
    TransactionRepository, UserFilter, UserRepository,
};
use crate::marketplace::service::{MarketplacePolicy, MarketplaceService};

pub(super) const PASSWORD: &str = "password123";
const TOKEN_SECRET: &str = "farm-konnect-test-secret";

pub(super) type TestService = MarketplaceService<DocumentStore, MemoryPhotos>;

/// Hashing is slow in debug builds, so fixtures share one hash of [`PASSWORD`].
pub(super) fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash fixture password"))
        .clone()
}

pub(super) fn tokens() -> TokenIssuer {
    TokenIssuer::new(TOKEN_SECRET, 30)
}

pub(super) fn token_for(user: &User) -> String {
    tokens().issue(&user.id).expect("issue token")
}

pub(super) fn build_service() -> (TestService, Arc<DocumentStore>, Arc<MemoryPhotos>) {
    build_service_with_policy(MarketplacePolicy::default())
}

pub(super) fn build_service_with_policy(
    policy: MarketplacePolicy,
) -> (TestService, Arc<DocumentStore>, Arc<MemoryPhotos>) {
    let store = Arc::new(DocumentStore::new());
    let photos = Arc::new(MemoryPhotos::default());
    let service = MarketplaceService::new(store.clone(), photos.clone(), tokens(), policy);
    (service, store, photos)
}

pub(super) fn seed_user(store: &DocumentStore, role: UserRole, email: &str) -> User {
    seed_user_with_status(store, role, UserStatus::Approved, email)
}

pub(super) fn seed_user_with_status(
    store: &DocumentStore,
    role: UserRole,
    status: UserStatus,
    email: &str,
) -> User {
    let mut profile = Profile::for_role(role);
    profile.full_name = format!("{} Tester", role.label());
    store
        .insert_user(User {
            id: UserId::generate(),
            email: email.to_string(),
            password_hash: password_hash(),
            role,
            status,
            profile,
            created_at: Utc::now(),
        })
        .expect("seed user")
}

/// Insert a listing created `age_minutes` ago.
pub(super) fn seed_listing(
    store: &DocumentStore,
    owner: &User,
    status: ListingStatus,
    title: &str,
    age_minutes: i64,
) -> Listing {
    store
        .insert_listing(Listing {
            id: ListingId::generate(),
            owner_id: owner.id,
            owner_name: owner.display_name(),
            title: title.to_string(),
            land_type: LandType::Arable,
            acreage: 50.0,
            city: "Abeokuta".to_string(),
            state: "Ogun".to_string(),
            features: vec!["Water Source".to_string(), "Road Access".to_string()],
            lease_duration: 24,
            rent_price: 150_000.0,
            description: "Fertile land suitable for maize and cassava.".to_string(),
            photos: Vec::new(),
            status,
            views: 0,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        })
        .expect("seed listing")
}

pub(super) fn seed_message(
    store: &DocumentStore,
    listing: &Listing,
    from: &User,
    to: &User,
    content: &str,
    age_minutes: i64,
) -> Message {
    store
        .insert_message(Message {
            id: MessageId::generate(),
            listing_id: listing.id,
            from_id: from.id,
            to_id: to.id,
            from_name: from.display_name(),
            content: content.to_string(),
            read: false,
            timestamp: Utc::now() - Duration::minutes(age_minutes),
        })
        .expect("seed message")
}

pub(super) fn listing_input() -> ListingInput {
    ListingInput {
        title: Some("  30 Acre Pasture Land  ".to_string()),
        land_type: Some("pasture".to_string()),
        acreage: Some(NumericField::Number(30.0)),
        city: Some("Ilorin".to_string()),
        state: Some("Kwara".to_string()),
        features: Some(vec!["Fenced".to_string(), "Water Source".to_string()]),
        lease_duration: Some(NumericField::Text("12".to_string())),
        rent_price: Some(NumericField::Number(80_000.0)),
        description: Some("Open grazing land.".to_string()),
    }
}

pub(super) fn jpeg(name: &str) -> PhotoUpload {
    PhotoUpload {
        file_name: Some(name.to_string()),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

/// Photo storage that keeps uploads in memory and hands out predictable paths.
#[derive(Default)]
pub(super) struct MemoryPhotos {
    stored: Mutex<Vec<(String, PhotoUpload)>>,
    written: AtomicUsize,
}

impl MemoryPhotos {
    /// Uploads currently held, in the order they were stored.
    pub(super) fn stored(&self) -> Vec<PhotoUpload> {
        self.stored
            .lock()
            .expect("photo mutex poisoned")
            .iter()
            .map(|(_, upload)| upload.clone())
            .collect()
    }
}

impl PhotoStorage for MemoryPhotos {
    fn store(&self, upload: &PhotoUpload) -> Result<String, PhotoStorageError> {
        let number = self.written.fetch_add(1, Ordering::SeqCst) + 1;
        let path = format!("/uploads/photo-{number}.jpg");
        self.stored
            .lock()
            .expect("photo mutex poisoned")
            .push((path.clone(), upload.clone()));
        Ok(path)
    }

    fn remove(&self, public_path: &str) -> Result<(), PhotoStorageError> {
        self.stored
            .lock()
            .expect("photo mutex poisoned")
            .retain(|(path, _)| path != public_path);
        Ok(())
    }
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }

    fn modify_user(
        &self,
        _id: &UserId,
        _change: impl FnOnce(&mut User),
    ) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn users(&self, _filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        offline()
    }
}

impl ListingRepository for UnavailableStore {
    fn insert_listing(&self, _listing: Listing) -> Result<Listing, RepositoryError> {
        offline()
    }

    fn modify_listing(
        &self,
        _id: &ListingId,
        _change: impl FnOnce(&mut Listing),
    ) -> Result<Option<Listing>, RepositoryError> {
        offline()
    }

    fn fetch_listing(&self, _id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        offline()
    }

    fn remove_listing(&self, _id: &ListingId) -> Result<(), RepositoryError> {
        offline()
    }

    fn listings(&self, _filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        offline()
    }

    fn record_listing_view(&self, _id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        offline()
    }
}

impl MessageRepository for UnavailableStore {
    fn insert_message(&self, _message: Message) -> Result<Message, RepositoryError> {
        offline()
    }

    fn modify_message(
        &self,
        _id: &MessageId,
        _change: impl FnOnce(&mut Message),
    ) -> Result<Option<Message>, RepositoryError> {
        offline()
    }

    fn fetch_message(&self, _id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        offline()
    }

    fn messages(&self, _filter: &MessageFilter) -> Result<Vec<Message>, RepositoryError> {
        offline()
    }
}

impl TransactionRepository for UnavailableStore {
    fn insert_transaction(
        &self,
        _transaction: Transaction,
    ) -> Result<Transaction, RepositoryError> {
        offline()
    }

    fn fetch_transaction(
        &self,
        _id: &TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        offline()
    }

    fn transactions(&self) -> Result<Vec<Transaction>, RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
