use std::sync::Arc;

use super::common::*;
use crate::marketplace::domain::{LandType, ListingStatus, UserRole};
use crate::marketplace::input::{ListingInput, NumericField};
use crate::marketplace::photos::PhotoUpload;
use crate::marketplace::repository::ListingRepository;
use crate::marketplace::memory::DocumentStore;
use crate::marketplace::service::{MarketplacePolicy, MarketplaceService, ServiceError};

#[test]
fn create_listing_is_pending_and_owned_by_landowner() {
    let (service, store, photos) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");

    let listing = service
        .create_listing(&owner, listing_input(), &[jpeg("front.jpg")])
        .expect("create succeeds");

    assert_eq!(listing.status, ListingStatus::Pending);
    assert_eq!(listing.owner_id, owner.id);
    assert_eq!(listing.owner_name, owner.display_name());
    assert_eq!(listing.title, "30 Acre Pasture Land");
    assert_eq!(listing.land_type, LandType::Pasture);
    assert_eq!(listing.lease_duration, 12);
    assert_eq!(listing.views, 0);
    assert_eq!(listing.photos, vec!["/uploads/photo-1.jpg".to_string()]);
    assert_eq!(photos.stored().len(), 1);
}

#[test]
fn create_listing_requires_landowner_role() {
    let (service, store, _) = build_service();
    let farmer = seed_user(&store, UserRole::Farmer, "farmer@example.com");

    match service.create_listing(&farmer, listing_input(), &[]) {
        Err(ServiceError::Forbidden(message)) => assert_eq!(
            message,
            "User role farmer is not authorized to access this route"
        ),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn create_listing_rejects_invalid_fields() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");

    let inputs = [
        ListingInput {
            title: Some("   ".to_string()),
            ..listing_input()
        },
        ListingInput {
            land_type: Some("swamp".to_string()),
            ..listing_input()
        },
        ListingInput {
            acreage: Some(NumericField::Number(-1.0)),
            ..listing_input()
        },
        ListingInput {
            lease_duration: Some(NumericField::Text("0".to_string())),
            ..listing_input()
        },
        ListingInput {
            rent_price: None,
            ..listing_input()
        },
    ];

    for input in inputs {
        assert!(matches!(
            service.create_listing(&owner, input, &[]),
            Err(ServiceError::Validation(_))
        ));
    }
    assert!(store.listings(&Default::default()).expect("list").is_empty());
}

#[test]
fn photo_checks_run_before_anything_is_stored() {
    let (service, store, photos) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");

    let document = PhotoUpload {
        file_name: Some("deed.pdf".to_string()),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.7".to_vec(),
    };
    assert!(matches!(
        service.create_listing(&owner, listing_input(), &[jpeg("a.jpg"), document]),
        Err(ServiceError::Validation(_))
    ));

    let too_many: Vec<_> = (0..6).map(|index| jpeg(&format!("{index}.jpg"))).collect();
    assert!(matches!(
        service.create_listing(&owner, listing_input(), &too_many),
        Err(ServiceError::Validation(_))
    ));

    assert!(photos.stored().is_empty());
    assert!(store.listings(&Default::default()).expect("list").is_empty());
}

#[test]
fn failed_create_discards_stored_photos() {
    let (_, accounts, _) = build_service();
    let owner = seed_user(&accounts, UserRole::Landowner, "owner@example.com");
    let photos = Arc::new(MemoryPhotos::default());
    let service = MarketplaceService::new(
        Arc::new(UnavailableStore),
        photos.clone(),
        tokens(),
        MarketplacePolicy::default(),
    );

    assert!(matches!(
        service.create_listing(&owner, listing_input(), &[jpeg("a.jpg"), jpeg("b.jpg")]),
        Err(ServiceError::Repository(_))
    ));
    assert!(photos.stored().is_empty());
}

#[test]
fn failed_update_discards_new_photos_and_keeps_the_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    std::fs::create_dir(&data_dir).expect("data dir");
    let store = Arc::new(DocumentStore::open(data_dir.join("farm.json")).expect("open"));
    let photos = Arc::new(MemoryPhotos::default());
    let service = MarketplaceService::new(
        store.clone(),
        photos.clone(),
        tokens(),
        MarketplacePolicy::default(),
    );
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let listing = service
        .create_listing(&owner, listing_input(), &[jpeg("kept.jpg")])
        .expect("listing created");

    std::fs::remove_dir_all(&data_dir).expect("remove data dir");
    let edit = ListingInput {
        title: Some("Renamed".to_string()),
        ..ListingInput::default()
    };
    assert!(matches!(
        service.update_listing(&owner, &listing.id.to_string(), edit, &[jpeg("new.jpg")]),
        Err(ServiceError::Repository(_))
    ));

    let stored = photos.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].file_name.as_deref(), Some("kept.jpg"));
    let current = store.fetch_listing(&listing.id).expect("fetch").expect("stored");
    assert_eq!(current.title, listing.title);
    assert_eq!(current.photos, listing.photos);
}

#[test]
fn approved_listings_are_newest_first_with_owner() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    seed_listing(&store, &owner, ListingStatus::Approved, "Older", 30);
    seed_listing(&store, &owner, ListingStatus::Pending, "Waiting", 5);
    seed_listing(&store, &owner, ListingStatus::Approved, "Newer", 10);
    seed_listing(&store, &owner, ListingStatus::Rented, "Taken", 1);

    let listings = service.approved_listings().expect("listings");
    let titles: Vec<_> = listings.iter().map(|view| view.listing.title.as_str()).collect();
    assert_eq!(titles, ["Newer", "Older"]);
    let summary = listings[0].owner.as_ref().expect("owner populated");
    assert_eq!(summary.email, "owner@example.com");
}

#[test]
fn viewing_a_listing_counts_each_view_once() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let listing = seed_listing(&store, &owner, ListingStatus::Approved, "Farm", 0);

    for expected in 1..=3 {
        let view = service
            .view_listing(&listing.id.to_string())
            .expect("listing found");
        assert_eq!(view.listing.views, expected);
    }

    let view = service
        .view_listing(&listing.id.to_string())
        .expect("listing found");
    let owner_summary = view.owner.expect("owner populated");
    assert_eq!(owner_summary.status, Some(owner.status));

    assert!(matches!(
        service.view_listing("missing"),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn my_listings_returns_only_own_listings() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let other = seed_user(&store, UserRole::Landowner, "other@example.com");
    seed_listing(&store, &owner, ListingStatus::Pending, "Mine", 2);
    seed_listing(&store, &owner, ListingStatus::Approved, "Mine too", 1);
    seed_listing(&store, &other, ListingStatus::Approved, "Theirs", 0);

    let listings = service.my_listings(&owner).expect("listings");
    let titles: Vec<_> = listings.iter().map(|listing| listing.title.as_str()).collect();
    assert_eq!(titles, ["Mine too", "Mine"]);
}

#[test]
fn update_listing_applies_editable_fields_only() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let listing = seed_listing(&store, &owner, ListingStatus::Pending, "Farm", 0);

    let updated = service
        .update_listing(
            &owner,
            &listing.id.to_string(),
            ListingInput {
                rent_price: Some(NumericField::Text("175000".to_string())),
                features: Some(vec!["Irrigation".to_string(), " ".to_string()]),
                ..ListingInput::default()
            },
            &[jpeg("new.jpg")],
        )
        .expect("update succeeds");

    assert_eq!(updated.rent_price, 175_000.0);
    assert_eq!(updated.features, vec!["Irrigation".to_string()]);
    assert_eq!(updated.title, listing.title);
    assert_eq!(updated.status, ListingStatus::Pending);
    assert_eq!(updated.photos.len(), 1);

    let stored = store
        .fetch_listing(&listing.id)
        .expect("fetch")
        .expect("stored");
    assert_eq!(stored, updated);
}

#[test]
fn update_and_delete_check_existence_then_ownership() {
    let (service, store, _) = build_service();
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let intruder = seed_user(&store, UserRole::Landowner, "intruder@example.com");
    let listing = seed_listing(&store, &owner, ListingStatus::Approved, "Farm", 0);
    let id = listing.id.to_string();

    match service.update_listing(&intruder, &id, ListingInput::default(), &[]) {
        Err(ServiceError::Forbidden(message)) => {
            assert_eq!(message, "Not authorized to update this listing")
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
    match service.delete_listing(&intruder, &id) {
        Err(ServiceError::Forbidden(message)) => {
            assert_eq!(message, "Not authorized to delete this listing")
        }
        other => panic!("expected forbidden, got {other:?}"),
    }

    service.delete_listing(&owner, &id).expect("owner deletes");
    assert!(store.fetch_listing(&listing.id).expect("fetch").is_none());
    assert!(matches!(
        service.delete_listing(&owner, &id),
        Err(ServiceError::NotFound(_))
    ));
}
