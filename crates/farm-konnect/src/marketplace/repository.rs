use super::domain::{
    Listing, ListingId, ListingStatus, Message, MessageId, Transaction, TransactionId, User,
    UserId, UserRole, UserStatus,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Selection applied to account queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub exclude_admins: bool,
}

impl UserFilter {
    pub fn non_admins() -> Self {
        Self {
            exclude_admins: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        if self.exclude_admins && user.is_admin() {
            return false;
        }
        self.role.map_or(true, |role| user.role == role)
            && self.status.map_or(true, |status| user.status == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub owner: Option<UserId>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.status.map_or(true, |status| listing.status == status)
            && self.owner.map_or(true, |owner| listing.owner_id == owner)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub listing: Option<ListingId>,
    /// Messages sent or received by this user.
    pub participant: Option<UserId>,
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        self.listing.map_or(true, |listing| message.listing_id == listing)
            && self
                .participant
                .map_or(true, |participant| message.involves(&participant))
    }
}

/// Account storage. E-mail addresses are unique.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    /// Apply `change` to the stored account under the store lock. Returns `None` when
    /// the account does not exist.
    fn modify_user(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut User),
    ) -> Result<Option<User>, RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError>;
}

pub trait ListingRepository: Send + Sync {
    fn insert_listing(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    /// Apply `change` to the stored listing without touching fields it leaves alone,
    /// so concurrent view increments survive.
    fn modify_listing(
        &self,
        id: &ListingId,
        change: impl FnOnce(&mut Listing),
    ) -> Result<Option<Listing>, RepositoryError>;
    fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn remove_listing(&self, id: &ListingId) -> Result<(), RepositoryError>;
    fn listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError>;
    /// Increment the view counter in place and return the updated listing.
    fn record_listing_view(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
}

pub trait MessageRepository: Send + Sync {
    fn insert_message(&self, message: Message) -> Result<Message, RepositoryError>;
    fn modify_message(
        &self,
        id: &MessageId,
        change: impl FnOnce(&mut Message),
    ) -> Result<Option<Message>, RepositoryError>;
    fn fetch_message(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;
    fn messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, RepositoryError>;
}

pub trait TransactionRepository: Send + Sync {
    fn insert_transaction(&self, transaction: Transaction)
        -> Result<Transaction, RepositoryError>;
    fn fetch_transaction(&self, id: &TransactionId)
        -> Result<Option<Transaction>, RepositoryError>;
    fn transactions(&self) -> Result<Vec<Transaction>, RepositoryError>;
}

/// Every collection the marketplace service reads and writes.
pub trait MarketplaceStore:
    UserRepository + ListingRepository + MessageRepository + TransactionRepository
{
}

impl<T> MarketplaceStore for T where
    T: UserRepository + ListingRepository + MessageRepository + TransactionRepository
{
}
