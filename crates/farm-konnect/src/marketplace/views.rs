//! Response shapes. Stored documents never leave the service directly: these views drop
//! credentials and attach summaries of referenced documents next to the raw ids.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Listing, ListingId, Message, Profile, Transaction, User, UserId, UserRole, UserStatus,
};

/// Account as returned by the auth, user, and admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub status: UserStatus,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            profile: user.profile.clone(),
            created_at: user.created_at,
        }
    }
}

/// Echo of a moderated account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatusView {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub status: UserStatus,
}

impl From<&User> for UserStatusView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

/// Referenced account embedded in listing, message, and transaction views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartySummary {
    pub id: UserId,
    pub email: String,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl PartySummary {
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            profile: user.profile.clone(),
            status: None,
        }
    }

    pub fn with_status(user: &User) -> Self {
        Self {
            status: Some(user.status),
            ..Self::of(user)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingTitle {
    pub id: ListingId,
    pub title: String,
}

impl From<&Listing> for ListingTitle {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    /// `None` when the owner account no longer exists.
    pub owner: Option<PartySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingTitle>,
    pub from: Option<PartySummary>,
    pub to: Option<PartySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub listing: Option<ListingTitle>,
    pub landowner_details: Option<PartySummary>,
    pub farmer_details: Option<PartySummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub farmers: usize,
    pub landowners: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListingStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountStats {
    pub total: usize,
}

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub users: UserStats,
    pub listings: ListingStats,
    pub messages: CountStats,
    pub transactions: CountStats,
}
