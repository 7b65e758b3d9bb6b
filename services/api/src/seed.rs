use chrono::{Duration, Utc};
use clap::Args;
use farm_konnect::config::AppConfig;
use farm_konnect::error::AppError;
use farm_konnect::marketplace::{
    hash_password, DocumentStore, LandType, Listing, ListingId, ListingStatus, MarketplaceStore,
    Profile, ServiceError, User, UserId, UserRole, UserStatus,
};
use farm_konnect::telemetry;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_DATA_FILE: &str = "farm-konnect-data.json";

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Snapshot file to seed. Defaults to DATA_FILE, then farm-konnect-data.json.
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

pub(crate) const ADMIN_EMAIL: &str = "admin@farmkonnect.com";
const ADMIN_PASSWORD: &str = "admin123";
const MEMBER_PASSWORD: &str = "password123";

struct SeedAccount {
    email: &'static str,
    role: UserRole,
    status: UserStatus,
    full_name: &'static str,
    phone: &'static str,
    location: &'static str,
    bio: &'static str,
    /// Experience, farming type, and references for farmers.
    farming: Option<(&'static str, &'static str, &'static str)>,
}

const ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        email: ADMIN_EMAIL,
        role: UserRole::Admin,
        status: UserStatus::Approved,
        full_name: "Admin User",
        phone: "+234-000-000-0000",
        location: "Lagos, Nigeria",
        bio: "Farm Konnect Administrator",
        farming: None,
    },
    SeedAccount {
        email: "john.farmer@example.com",
        role: UserRole::Farmer,
        status: UserStatus::Approved,
        full_name: "John Farmer",
        phone: "+234-801-234-5678",
        location: "Abeokuta, Ogun",
        bio: "Experienced crop farmer with 10 years of experience",
        farming: Some(("10", "crops", "Previous landowner: +234-802-345-6789")),
    },
    SeedAccount {
        email: "mary.farmer@example.com",
        role: UserRole::Farmer,
        status: UserStatus::Approved,
        full_name: "Mary Okafor",
        phone: "+234-803-456-7890",
        location: "Ibadan, Oyo",
        bio: "Livestock specialist focusing on poultry and goats",
        farming: Some(("5", "livestock", "Previous employer: +234-804-567-8901")),
    },
    SeedAccount {
        email: "james.farmer@example.com",
        role: UserRole::Farmer,
        status: UserStatus::Pending,
        full_name: "James Adeyemi",
        phone: "+234-805-678-9012",
        location: "Osogbo, Osun",
        bio: "New farmer looking for opportunities",
        farming: Some(("3", "mixed", "")),
    },
    SeedAccount {
        email: "chief.landowner@example.com",
        role: UserRole::Landowner,
        status: UserStatus::Approved,
        full_name: "Chief Adebayo",
        phone: "+234-806-789-0123",
        location: "Lagos, Lagos",
        bio: "Landowner with multiple properties",
        farming: None,
    },
    SeedAccount {
        email: "mrs.landowner@example.com",
        role: UserRole::Landowner,
        status: UserStatus::Approved,
        full_name: "Mrs. Chukwu",
        phone: "+234-807-890-1234",
        location: "Enugu, Enugu",
        bio: "Family-owned farmland",
        farming: None,
    },
    SeedAccount {
        email: "new.landowner@example.com",
        role: UserRole::Landowner,
        status: UserStatus::Pending,
        full_name: "New Landowner",
        phone: "+234-808-901-2345",
        location: "Port Harcourt, Rivers",
        bio: "Recently acquired land",
        farming: None,
    },
];

struct SeedListing {
    owner: &'static str,
    title: &'static str,
    land_type: LandType,
    acreage: f64,
    city: &'static str,
    state: &'static str,
    features: &'static [&'static str],
    lease_duration: u32,
    rent_price: f64,
    description: &'static str,
    status: ListingStatus,
}

const LISTINGS: &[SeedListing] = &[
    SeedListing {
        owner: "chief.landowner@example.com",
        title: "50 Acre Arable Farm in Ogun State",
        land_type: LandType::Arable,
        acreage: 50.0,
        city: "Abeokuta",
        state: "Ogun",
        features: &["Water Source", "Road Access", "Electricity"],
        lease_duration: 24,
        rent_price: 150_000.0,
        description: "Prime farmland with excellent access to water and electricity. Perfect for crop production.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "chief.landowner@example.com",
        title: "30 Acre Pasture Land in Lagos",
        land_type: LandType::Pasture,
        acreage: 30.0,
        city: "Lagos",
        state: "Lagos",
        features: &["Fencing", "Water Source", "Road Access"],
        lease_duration: 36,
        rent_price: 200_000.0,
        description: "Well-maintained pasture land with fencing and water access. Ideal for livestock.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "mrs.landowner@example.com",
        title: "25 Acre Mixed Use Farm in Enugu",
        land_type: LandType::Mixed,
        acreage: 25.0,
        city: "Enugu",
        state: "Enugu",
        features: &["Water Source", "Irrigation", "Storage Buildings"],
        lease_duration: 18,
        rent_price: 120_000.0,
        description: "Versatile farmland suitable for both crops and livestock.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "mrs.landowner@example.com",
        title: "40 Acre Orchard in Oyo State",
        land_type: LandType::Orchard,
        acreage: 40.0,
        city: "Ibadan",
        state: "Oyo",
        features: &["Water Source", "Road Access", "Electricity", "Irrigation"],
        lease_duration: 48,
        rent_price: 180_000.0,
        description: "Mature orchard with established irrigation system.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "chief.landowner@example.com",
        title: "20 Acre Farm in Osun State",
        land_type: LandType::Arable,
        acreage: 20.0,
        city: "Osogbo",
        state: "Osun",
        features: &["Water Source", "Road Access"],
        lease_duration: 12,
        rent_price: 100_000.0,
        description: "Smaller farm perfect for starting farmers.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "mrs.landowner@example.com",
        title: "60 Acre Premium Farm",
        land_type: LandType::Arable,
        acreage: 60.0,
        city: "Port Harcourt",
        state: "Rivers",
        features: &[
            "Water Source",
            "Road Access",
            "Electricity",
            "Irrigation",
            "Storage Buildings",
        ],
        lease_duration: 60,
        rent_price: 250_000.0,
        description: "Large premium farmland with all modern amenities.",
        status: ListingStatus::Approved,
    },
    SeedListing {
        owner: "new.landowner@example.com",
        title: "35 Acre New Farm Listing",
        land_type: LandType::Mixed,
        acreage: 35.0,
        city: "Uyo",
        state: "Akwa Ibom",
        features: &["Water Source", "Road Access"],
        lease_duration: 24,
        rent_price: 140_000.0,
        description: "Newly listed farmland awaiting approval.",
        status: ListingStatus::Pending,
    },
];

/// Counts of documents written by [`seed_marketplace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) users: usize,
    pub(crate) listings: usize,
}

/// Load the demo accounts and listings. Does nothing when the admin account already
/// exists, so repeated runs against a persisted store are harmless.
pub(crate) fn seed_marketplace<S>(store: &S) -> Result<SeedSummary, AppError>
where
    S: MarketplaceStore,
{
    if store.find_user_by_email(ADMIN_EMAIL)?.is_some() {
        info!("demo data already present, skipping seed");
        return Ok(SeedSummary::default());
    }

    let now = Utc::now();
    let admin_hash = hash_password(ADMIN_PASSWORD).map_err(ServiceError::from)?;
    let member_hash = hash_password(MEMBER_PASSWORD).map_err(ServiceError::from)?;

    let mut users = Vec::with_capacity(ACCOUNTS.len());
    for (index, account) in ACCOUNTS.iter().enumerate() {
        let mut profile = Profile::for_role(account.role);
        profile.full_name = account.full_name.to_string();
        profile.phone = account.phone.to_string();
        profile.location = account.location.to_string();
        profile.bio = account.bio.to_string();
        if let Some((experience, farming_type, references)) = account.farming {
            profile.experience = Some(experience.to_string());
            profile.farming_type = Some(farming_type.to_string());
            profile.references = Some(references.to_string());
        }

        let password_hash = if account.role == UserRole::Admin {
            admin_hash.clone()
        } else {
            member_hash.clone()
        };
        let user = store.insert_user(User {
            id: UserId::generate(),
            email: account.email.to_string(),
            password_hash,
            role: account.role,
            status: account.status,
            profile,
            created_at: now - minutes_before(ACCOUNTS.len(), index),
        })?;
        users.push(user);
    }

    let mut listings = 0;
    for (index, seed) in LISTINGS.iter().enumerate() {
        let Some(owner) = users.iter().find(|user| user.email == seed.owner) else {
            continue;
        };
        store.insert_listing(Listing {
            id: ListingId::generate(),
            owner_id: owner.id,
            owner_name: owner.display_name(),
            title: seed.title.to_string(),
            land_type: seed.land_type,
            acreage: seed.acreage,
            city: seed.city.to_string(),
            state: seed.state.to_string(),
            features: seed.features.iter().map(|feature| feature.to_string()).collect(),
            lease_duration: seed.lease_duration,
            rent_price: seed.rent_price,
            description: seed.description.to_string(),
            photos: Vec::new(),
            status: seed.status,
            views: 0,
            created_at: now - minutes_before(LISTINGS.len(), index),
        })?;
        listings += 1;
    }

    info!(users = users.len(), listings, admin = ADMIN_EMAIL, "demo data seeded");
    Ok(SeedSummary {
        users: users.len(),
        listings,
    })
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let path = args
        .data_file
        .or(config.storage.data_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
    let store = DocumentStore::open(&path)?;
    let summary = seed_marketplace(&store)?;

    println!("Seeded {}", path.display());
    println!("  Accounts created: {}", summary.users);
    println!("  Listings created: {}", summary.listings);
    println!("Sample accounts:");
    println!("  Admin: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    println!("  Farmer: john.farmer@example.com / {MEMBER_PASSWORD}");
    println!("  Landowner: chief.landowner@example.com / {MEMBER_PASSWORD}");
    Ok(())
}

/// Spread creation times so that later entries sort as newer.
fn minutes_before(total: usize, index: usize) -> Duration {
    Duration::minutes((total - index) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_konnect::marketplace::repository::{ListingFilter, UserFilter};
    use farm_konnect::marketplace::{
        verify_password, DocumentStore, ListingRepository, UserRepository,
    };

    #[test]
    fn seed_loads_accounts_and_listings_once() {
        let store = DocumentStore::new();

        let summary = seed_marketplace(&store).expect("seed succeeds");
        assert_eq!(
            summary,
            SeedSummary {
                users: 7,
                listings: 7
            }
        );

        let admin = store
            .find_user_by_email(ADMIN_EMAIL)
            .expect("lookup")
            .expect("admin seeded");
        assert!(admin.is_admin());
        assert!(verify_password(ADMIN_PASSWORD, &admin.password_hash).expect("verify"));

        let approved = store
            .listings(&ListingFilter {
                status: Some(ListingStatus::Approved),
                ..ListingFilter::default()
            })
            .expect("listings");
        assert_eq!(approved.len(), 6);

        let farmers = store
            .users(&UserFilter {
                role: Some(UserRole::Farmer),
                ..UserFilter::default()
            })
            .expect("users");
        assert_eq!(farmers.len(), 3);
        assert!(farmers
            .iter()
            .all(|farmer| farmer.profile.farming_type.is_some()));

        let again = seed_marketplace(&store).expect("second run");
        assert_eq!(again, SeedSummary::default());
        assert_eq!(store.users(&UserFilter::default()).expect("users").len(), 7);
    }
}
