//! Request bodies and the validation that turns them into domain values.
//!
//! Every field is optional at the serde layer so that a missing field surfaces as a
//! `400` with a readable message instead of a generic deserialization rejection.

use serde::{Deserialize, Serialize};

use super::domain::{LandType, ListingId, UserId, UserRole};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Client input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

fn required_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub role: Option<String>,
}

/// Registration fields after validation. The e-mail is normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterInput {
    pub fn validate(self) -> Result<Registration, ValidationError> {
        let (Some(email), Some(password), Some(role)) = (
            required_text(self.email.as_deref()),
            self.password.filter(|password| !password.is_empty()),
            required_text(self.role.as_deref()),
        ) else {
            return Err(ValidationError::new("Please provide all required fields"));
        };

        let role = role
            .parse::<UserRole>()
            .map_err(|_| ValidationError::new("Invalid user type"))?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        Ok(Registration {
            email: normalize_email(&email),
            password,
            role,
        })
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginInput {
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        match (
            required_text(self.email.as_deref()),
            self.password.filter(|password| !password.is_empty()),
        ) {
            (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
            _ => Err(ValidationError::new("Please provide email and password")),
        }
    }
}

/// Numeric form value. Browser forms submit numbers as text, JSON clients as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn to_f64(&self, field: &str) -> Result<f64, ValidationError> {
        let value = match self {
            NumericField::Number(value) => *value,
            NumericField::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::new(format!("{field} must be a number")))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ValidationError::new(format!("{field} must be a number")))
        }
    }
}

/// Listing fields as submitted by a JSON body or a multipart form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingInput {
    pub title: Option<String>,
    pub land_type: Option<String>,
    pub acreage: Option<NumericField>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub features: Option<Vec<String>>,
    pub lease_duration: Option<NumericField>,
    pub rent_price: Option<NumericField>,
    pub description: Option<String>,
}

/// Validated listing content, used both for creation and for owner edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub land_type: Option<LandType>,
    pub acreage: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub features: Option<Vec<String>>,
    pub lease_duration: Option<u32>,
    pub rent_price: Option<f64>,
    pub description: Option<String>,
}

/// Complete set of fields required to create a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub land_type: LandType,
    pub acreage: f64,
    pub city: String,
    pub state: String,
    pub features: Vec<String>,
    pub lease_duration: u32,
    pub rent_price: f64,
    pub description: String,
}

impl ListingInput {
    /// Record one multipart text field. Unknown fields are ignored.
    pub fn set_form_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "landType" => self.land_type = Some(value),
            "acreage" => self.acreage = Some(NumericField::Text(value)),
            "city" => self.city = Some(value),
            "state" => self.state = Some(value),
            "features" | "features[]" => self.features.get_or_insert_with(Vec::new).push(value),
            "leaseDuration" => self.lease_duration = Some(NumericField::Text(value)),
            "rentPrice" => self.rent_price = Some(NumericField::Text(value)),
            "description" => self.description = Some(value),
            _ => {}
        }
    }

    /// Validate whichever fields are present.
    pub fn changes(self) -> Result<ListingChanges, ValidationError> {
        let title = self
            .title
            .map(|title| {
                required_text(Some(title.as_str()))
                    .ok_or_else(|| ValidationError::new("Please provide a title"))
            })
            .transpose()?;
        let land_type = self
            .land_type
            .map(|raw| {
                raw.trim()
                    .parse::<LandType>()
                    .map_err(|_| ValidationError::new("Invalid land type"))
            })
            .transpose()?;
        let acreage = self
            .acreage
            .map(|field| non_negative(field.to_f64("acreage")?, "acreage"))
            .transpose()?;
        let city = self
            .city
            .map(|city| {
                required_text(Some(city.as_str()))
                    .ok_or_else(|| ValidationError::new("Please provide a city"))
            })
            .transpose()?;
        let state = self
            .state
            .map(|state| {
                required_text(Some(state.as_str()))
                    .ok_or_else(|| ValidationError::new("Please provide a state"))
            })
            .transpose()?;
        let features = self.features.map(clean_features);
        let lease_duration = self
            .lease_duration
            .map(|field| lease_months(field.to_f64("leaseDuration")?))
            .transpose()?;
        let rent_price = self
            .rent_price
            .map(|field| non_negative(field.to_f64("rentPrice")?, "rentPrice"))
            .transpose()?;

        Ok(ListingChanges {
            title,
            land_type,
            acreage,
            city,
            state,
            features,
            lease_duration,
            rent_price,
            description: self.description,
        })
    }

    /// Validate a creation request, where the descriptive fields are mandatory.
    pub fn draft(self) -> Result<ListingDraft, ValidationError> {
        let changes = self.changes()?;
        Ok(ListingDraft {
            title: changes
                .title
                .ok_or_else(|| ValidationError::new("Please provide a title"))?,
            land_type: changes
                .land_type
                .ok_or_else(|| ValidationError::new("Please provide a land type"))?,
            acreage: changes
                .acreage
                .ok_or_else(|| ValidationError::new("Please provide acreage"))?,
            city: changes
                .city
                .ok_or_else(|| ValidationError::new("Please provide a city"))?,
            state: changes
                .state
                .ok_or_else(|| ValidationError::new("Please provide a state"))?,
            features: changes.features.unwrap_or_default(),
            lease_duration: changes
                .lease_duration
                .ok_or_else(|| ValidationError::new("Please provide lease duration in months"))?,
            rent_price: changes
                .rent_price
                .ok_or_else(|| ValidationError::new("Please provide rent price"))?,
            description: changes.description.unwrap_or_default(),
        })
    }
}

fn non_negative(value: f64, field: &str) -> Result<f64, ValidationError> {
    if value < 0.0 {
        Err(ValidationError::new(format!("{field} cannot be negative")))
    } else {
        Ok(value)
    }
}

fn lease_months(value: f64) -> Result<u32, ValidationError> {
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return Err(ValidationError::new(
            "leaseDuration must be a whole number of months, at least 1",
        ));
    }
    Ok(value as u32)
}

fn clean_features(features: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(features.len());
    for feature in features {
        let feature = feature.trim();
        if !feature.is_empty() && !cleaned.iter().any(|existing| existing == feature) {
            cleaned.push(feature.to_string());
        }
    }
    cleaned
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageInput {
    pub listing_id: Option<String>,
    pub to_id: Option<String>,
    pub content: Option<String>,
}

/// Message fields after validation. The listing id is kept raw so that an unknown or
/// malformed value resolves to "Listing not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub listing_id: Option<ListingId>,
    pub to_id: UserId,
    pub content: String,
}

impl MessageInput {
    pub fn validate(self) -> Result<MessageDraft, ValidationError> {
        let (Some(listing_id), Some(to_id), Some(content)) = (
            required_text(self.listing_id.as_deref()),
            required_text(self.to_id.as_deref()),
            required_text(self.content.as_deref()),
        ) else {
            return Err(ValidationError::new("Please provide all required fields"));
        };

        let to_id =
            UserId::parse(&to_id).ok_or_else(|| ValidationError::new("Invalid recipient id"))?;

        Ok(MessageDraft {
            listing_id: ListingId::parse(&listing_id),
            to_id,
            content,
        })
    }
}

/// Body of the admin status endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusInput {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionInput {
    pub listing_id: Option<String>,
    pub landowner: Option<String>,
    pub farmer: Option<String>,
    pub total_amount: Option<NumericField>,
    pub platform_fee: Option<NumericField>,
    pub payment_details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub listing_id: Option<ListingId>,
    pub landowner: UserId,
    pub farmer: UserId,
    pub total_amount: f64,
    pub platform_fee: f64,
    pub payment_details: serde_json::Value,
}

impl TransactionInput {
    pub fn validate(self) -> Result<TransactionDraft, ValidationError> {
        let missing = || ValidationError::new("Please provide all required fields");

        let listing_id = required_text(self.listing_id.as_deref()).ok_or_else(missing)?;
        let landowner = required_text(self.landowner.as_deref()).ok_or_else(missing)?;
        let farmer = required_text(self.farmer.as_deref()).ok_or_else(missing)?;
        let total_amount = self.total_amount.ok_or_else(missing)?.to_f64("totalAmount")?;
        if total_amount == 0.0 {
            return Err(missing());
        }
        let total_amount = non_negative(total_amount, "totalAmount")?;

        let platform_fee = self
            .platform_fee
            .map(|field| non_negative(field.to_f64("platformFee")?, "platformFee"))
            .transpose()?
            .unwrap_or(0.0);

        let landowner = UserId::parse(&landowner)
            .ok_or_else(|| ValidationError::new("Invalid landowner id"))?;
        let farmer =
            UserId::parse(&farmer).ok_or_else(|| ValidationError::new("Invalid farmer id"))?;

        let payment_details = match self.payment_details {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(details) => details,
        };

        Ok(TransactionDraft {
            listing_id: ListingId::parse(&listing_id),
            landowner,
            farmer,
            total_amount,
            platform_fee,
            payment_details,
        })
    }
}
