use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier taken from a path or request body.
            pub fn parse(raw: &str) -> Option<Self> {
                Uuid::parse_str(raw.trim()).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

document_id!(
    /// Identifier for registered accounts.
    UserId
);
document_id!(
    /// Identifier for land listings.
    ListingId
);
document_id!(MessageId);
document_id!(TransactionId);

/// Raised when a string does not name a member of one of the enumerated fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(
    /// Account type chosen at registration.
    UserRole, "user type" {
        Farmer => "farmer",
        Landowner => "landowner",
        Admin => "admin",
    }
);

labelled_enum!(
    /// Moderation state of an account.
    UserStatus, "user status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

labelled_enum!(
    /// Moderation and lifecycle state of a listing.
    ListingStatus, "listing status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Rented => "rented",
    }
);

labelled_enum!(
    LandType, "land type" {
        Arable => "arable",
        Pasture => "pasture",
        Orchard => "orchard",
        Mixed => "mixed",
    }
);

labelled_enum!(
    TransactionStatus, "transaction status" {
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

/// Public profile details. The farmer-only fields are absent for other account types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farming_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl Profile {
    /// Blank profile shaped for the given account type.
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Farmer => Self {
                experience: Some(String::new()),
                farming_type: Some(String::new()),
                references: Some(String::new()),
                ..Self::default()
            },
            UserRole::Landowner | UserRole::Admin => Self::default(),
        }
    }

    /// Overlay the provided fields, leaving the rest untouched.
    pub fn merge(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            full_name,
            phone,
            location,
            bio,
            experience,
            farming_type,
            references,
        } = update;

        if let Some(value) = full_name {
            self.full_name = value;
        }
        if let Some(value) = phone {
            self.phone = value;
        }
        if let Some(value) = location {
            self.location = value;
        }
        if let Some(value) = bio {
            self.bio = value;
        }
        if experience.is_some() {
            self.experience = experience;
        }
        if farming_type.is_some() {
            self.farming_type = farming_type;
        }
        if references.is_some() {
            self.references = references;
        }
    }
}

/// Partial profile accepted by the profile update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub farming_type: Option<String>,
    pub references: Option<String>,
}

/// Stored account document. Only ever leaves the service through the views module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub status: UserStatus,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown to other users: the profile name, else the e-mail address.
    pub fn display_name(&self) -> String {
        let name = self.profile.full_name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A parcel of land offered for lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: UserId,
    pub owner_name: String,
    pub title: String,
    pub land_type: LandType,
    pub acreage: f64,
    pub city: String,
    pub state: String,
    pub features: Vec<String>,
    /// Lease length in months.
    pub lease_duration: u32,
    pub rent_price: f64,
    pub description: String,
    pub photos: Vec<String>,
    pub status: ListingStatus,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub listing_id: ListingId,
    pub from_id: UserId,
    pub to_id: UserId,
    pub from_name: String,
    pub content: String,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, user: &UserId) -> bool {
        self.from_id == *user || self.to_id == *user
    }
}

/// Recorded lease agreement between a landowner and a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub landowner: UserId,
    pub farmer: UserId,
    pub total_amount: f64,
    pub platform_fee: f64,
    pub status: TransactionStatus,
    /// Opaque payment metadata supplied by the admin.
    pub payment_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_party(&self, user: &UserId) -> bool {
        self.landowner == *user || self.farmer == *user
    }
}
