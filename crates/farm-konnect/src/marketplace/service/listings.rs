use chrono::Utc;
use tracing::info;

use super::{require_role, MarketplaceService, ServiceError};
use crate::marketplace::domain::{Listing, ListingId, ListingStatus, User, UserRole};
use crate::marketplace::input::{ListingChanges, ListingInput};
use crate::marketplace::photos::{PhotoStorage, PhotoUpload};
use crate::marketplace::repository::{ListingFilter, MarketplaceStore};
use crate::marketplace::views::{ListingView, PartySummary};

pub(super) const LISTING_NOT_FOUND: &str = "Listing not found";

pub(super) fn newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    /// Publish a new listing for moderation. Only landowners may list land.
    pub fn create_listing(
        &self,
        actor: &User,
        input: ListingInput,
        photos: &[PhotoUpload],
    ) -> Result<Listing, ServiceError> {
        require_role(actor, UserRole::Landowner)?;
        let draft = input.draft()?;
        let photos = self.store_photos(photos)?;

        let listing = Listing {
            id: ListingId::generate(),
            owner_id: actor.id,
            owner_name: actor.display_name(),
            title: draft.title,
            land_type: draft.land_type,
            acreage: draft.acreage,
            city: draft.city,
            state: draft.state,
            features: draft.features,
            lease_duration: draft.lease_duration,
            rent_price: draft.rent_price,
            description: draft.description,
            photos,
            status: ListingStatus::Pending,
            views: 0,
            created_at: Utc::now(),
        };

        let stored_photos = listing.photos.clone();
        let listing = self
            .store
            .insert_listing(listing)
            .map_err(|err| self.discard_photos(&stored_photos, err.into()))?;
        info!(listing_id = %listing.id, owner_id = %actor.id, "listing created");
        Ok(listing)
    }

    /// Approved listings, newest first, with their owners.
    pub fn approved_listings(&self) -> Result<Vec<ListingView>, ServiceError> {
        let mut listings = self.store.listings(&ListingFilter {
            status: Some(ListingStatus::Approved),
            ..ListingFilter::default()
        })?;
        newest_first(&mut listings);
        self.listing_views(listings)
    }

    /// Fetch a listing for display, counting the view.
    pub fn view_listing(&self, id: &str) -> Result<ListingView, ServiceError> {
        let listing = ListingId::parse(id)
            .map(|id| self.store.record_listing_view(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(LISTING_NOT_FOUND))?;

        let owner = self
            .store
            .fetch_user(&listing.owner_id)?
            .as_ref()
            .map(PartySummary::with_status);
        Ok(ListingView { listing, owner })
    }

    pub fn my_listings(&self, actor: &User) -> Result<Vec<Listing>, ServiceError> {
        require_role(actor, UserRole::Landowner)?;
        let mut listings = self.store.listings(&ListingFilter {
            owner: Some(actor.id),
            ..ListingFilter::default()
        })?;
        newest_first(&mut listings);
        Ok(listings)
    }

    /// Apply owner edits. Status, views, and ownership are not editable here.
    pub fn update_listing(
        &self,
        actor: &User,
        id: &str,
        input: ListingInput,
        photos: &[PhotoUpload],
    ) -> Result<Listing, ServiceError> {
        require_role(actor, UserRole::Landowner)?;
        let listing = self.owned_listing(actor, id, "Not authorized to update this listing")?;

        let changes = input.changes()?;
        let added = self.store_photos(photos)?;
        let appended = added.clone();
        let updated = self.store.modify_listing(&listing.id, |listing| {
            apply_changes(listing, changes);
            listing.photos.extend(appended);
        });
        let listing = match updated {
            Ok(Some(listing)) => listing,
            Ok(None) => {
                let missing = ServiceError::NotFound(LISTING_NOT_FOUND);
                return Err(self.discard_photos(&added, missing));
            }
            Err(err) => return Err(self.discard_photos(&added, err.into())),
        };
        info!(listing_id = %listing.id, "listing updated");
        Ok(listing)
    }

    /// Remove a listing. Messages and transactions that reference it are left in place.
    pub fn delete_listing(&self, actor: &User, id: &str) -> Result<(), ServiceError> {
        require_role(actor, UserRole::Landowner)?;
        let listing = self.owned_listing(actor, id, "Not authorized to delete this listing")?;
        self.store.remove_listing(&listing.id)?;
        info!(listing_id = %listing.id, "listing deleted");
        Ok(())
    }

    fn owned_listing(
        &self,
        actor: &User,
        id: &str,
        forbidden: &str,
    ) -> Result<Listing, ServiceError> {
        let listing = ListingId::parse(id)
            .map(|id| self.store.fetch_listing(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(LISTING_NOT_FOUND))?;

        if listing.is_owned_by(&actor.id) {
            Ok(listing)
        } else {
            Err(ServiceError::Forbidden(forbidden.to_string()))
        }
    }

    pub(super) fn listing_views(
        &self,
        listings: Vec<Listing>,
    ) -> Result<Vec<ListingView>, ServiceError> {
        listings
            .into_iter()
            .map(|listing| {
                let owner = self.party(&listing.owner_id)?;
                Ok(ListingView { listing, owner })
            })
            .collect()
    }
}

fn apply_changes(listing: &mut Listing, changes: ListingChanges) {
    let ListingChanges {
        title,
        land_type,
        acreage,
        city,
        state,
        features,
        lease_duration,
        rent_price,
        description,
    } = changes;

    if let Some(title) = title {
        listing.title = title;
    }
    if let Some(land_type) = land_type {
        listing.land_type = land_type;
    }
    if let Some(acreage) = acreage {
        listing.acreage = acreage;
    }
    if let Some(city) = city {
        listing.city = city;
    }
    if let Some(state) = state {
        listing.state = state;
    }
    if let Some(features) = features {
        listing.features = features;
    }
    if let Some(lease_duration) = lease_duration {
        listing.lease_duration = lease_duration;
    }
    if let Some(rent_price) = rent_price {
        listing.rent_price = rent_price;
    }
    if let Some(description) = description {
        listing.description = description;
    }
}
