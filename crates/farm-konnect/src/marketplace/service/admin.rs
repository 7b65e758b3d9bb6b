use tracing::info;

use super::listings::{newest_first, LISTING_NOT_FOUND};
use super::{require_role, MarketplaceService, ServiceError};
use crate::marketplace::domain::{
    Listing, ListingId, ListingStatus, User, UserId, UserRole, UserStatus,
};
use crate::marketplace::input::StatusInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::{ListingFilter, MarketplaceStore, UserFilter};
use crate::marketplace::views::{
    CountStats, ListingStats, ListingView, PlatformStats, UserStats, UserView,
};

const INVALID_STATUS: &str = "Invalid status";

/// Parse a moderation target. Any member of the allow-list is accepted from any
/// current state.
fn parse_status<T: std::str::FromStr>(input: StatusInput) -> Result<T, ServiceError> {
    input
        .status
        .as_deref()
        .and_then(|raw| raw.parse::<T>().ok())
        .ok_or_else(|| ServiceError::Validation(INVALID_STATUS.to_string()))
}

fn count_users(users: &[User], predicate: impl Fn(&User) -> bool) -> usize {
    users.iter().filter(|user| predicate(user)).count()
}

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    /// Every non-admin account, newest first.
    pub fn admin_users(&self, actor: &User) -> Result<Vec<UserView>, ServiceError> {
        require_role(actor, UserRole::Admin)?;
        let mut users = self.store.users(&UserFilter::non_admins())?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users.iter().map(UserView::from).collect())
    }

    pub fn set_user_status(
        &self,
        actor: &User,
        id: &str,
        input: StatusInput,
    ) -> Result<User, ServiceError> {
        require_role(actor, UserRole::Admin)?;
        let status: UserStatus = parse_status(input)?;

        let mut previous = status;
        let user = UserId::parse(id)
            .map(|id| {
                self.store.modify_user(&id, |user| {
                    previous = user.status;
                    user.status = status;
                })
            })
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound("User not found"))?;

        info!(
            user_id = %user.id,
            admin_id = %actor.id,
            from = %previous,
            to = %status,
            "user status changed"
        );
        Ok(user)
    }

    /// Every listing regardless of status, newest first.
    pub fn admin_listings(&self, actor: &User) -> Result<Vec<ListingView>, ServiceError> {
        require_role(actor, UserRole::Admin)?;
        let mut listings = self.store.listings(&ListingFilter::default())?;
        newest_first(&mut listings);
        self.listing_views(listings)
    }

    pub fn set_listing_status(
        &self,
        actor: &User,
        id: &str,
        input: StatusInput,
    ) -> Result<Listing, ServiceError> {
        require_role(actor, UserRole::Admin)?;
        let status: ListingStatus = parse_status(input)?;

        let mut previous = status;
        let listing = ListingId::parse(id)
            .map(|id| {
                self.store.modify_listing(&id, |listing| {
                    previous = listing.status;
                    listing.status = status;
                })
            })
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(LISTING_NOT_FOUND))?;

        info!(
            listing_id = %listing.id,
            admin_id = %actor.id,
            from = %previous,
            to = %status,
            "listing status changed"
        );
        Ok(listing)
    }

    pub fn platform_stats(&self, actor: &User) -> Result<PlatformStats, ServiceError> {
        require_role(actor, UserRole::Admin)?;

        let users = self.store.users(&UserFilter::non_admins())?;
        let listings = self.store.listings(&ListingFilter::default())?;
        let count_listings = |status: ListingStatus| {
            listings
                .iter()
                .filter(|listing| listing.status == status)
                .count()
        };

        Ok(PlatformStats {
            users: UserStats {
                total: users.len(),
                pending: count_users(&users, |user| user.status == UserStatus::Pending),
                approved: count_users(&users, |user| user.status == UserStatus::Approved),
                farmers: count_users(&users, |user| user.role == UserRole::Farmer),
                landowners: count_users(&users, |user| user.role == UserRole::Landowner),
            },
            listings: ListingStats {
                total: listings.len(),
                pending: count_listings(ListingStatus::Pending),
                approved: count_listings(ListingStatus::Approved),
            },
            messages: CountStats {
                total: self.store.messages(&Default::default())?.len(),
            },
            transactions: CountStats {
                total: self.store.transactions()?.len(),
            },
        })
    }
}
