use super::common::*;
use crate::marketplace::domain::{ListingStatus, UserRole, UserStatus};
use crate::marketplace::input::StatusInput;
use crate::marketplace::repository::{ListingRepository, UserRepository};
use crate::marketplace::service::ServiceError;

fn status(value: &str) -> StatusInput {
    StatusInput {
        status: Some(value.to_string()),
    }
}

#[test]
fn admin_operations_reject_other_roles() {
    let (service, store, _) = build_service();
    let farmer = seed_user(&store, UserRole::Farmer, "farmer@example.com");
    let landowner = seed_user(&store, UserRole::Landowner, "owner@example.com");

    for actor in [&farmer, &landowner] {
        assert!(matches!(
            service.admin_users(actor),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.admin_listings(actor),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.platform_stats(actor),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.set_user_status(actor, &farmer.id.to_string(), status("approved")),
            Err(ServiceError::Forbidden(_))
        ));
    }
}

#[test]
fn admin_users_exclude_admins_newest_first() {
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    seed_user(&store, UserRole::Farmer, "first@example.com");
    std::thread::sleep(std::time::Duration::from_millis(2));
    seed_user(&store, UserRole::Landowner, "second@example.com");

    let users = service.admin_users(&admin).expect("users");
    let emails: Vec<_> = users.iter().map(|user| user.email.as_str()).collect();
    assert_eq!(emails, ["second@example.com", "first@example.com"]);
}

#[test]
fn user_status_is_validated_before_lookup() {
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    let farmer =
        seed_user_with_status(&store, UserRole::Farmer, UserStatus::Pending, "f@example.com");

    match service.set_user_status(&admin, "missing", status("banned")) {
        Err(ServiceError::Validation(message)) => assert_eq!(message, "Invalid status"),
        other => panic!("expected invalid status, got {other:?}"),
    }
    assert!(matches!(
        service.set_user_status(&admin, "missing", status("approved")),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.set_user_status(&admin, &farmer.id.to_string(), StatusInput::default()),
        Err(ServiceError::Validation(_))
    ));

    let updated = service
        .set_user_status(&admin, &farmer.id.to_string(), status("approved"))
        .expect("status updated");
    assert_eq!(updated.status, UserStatus::Approved);

    // Transitions are not restricted beyond the allow-list.
    service
        .set_user_status(&admin, &farmer.id.to_string(), status("pending"))
        .expect("back to pending");
    let stored = store.fetch_user(&farmer.id).expect("fetch").expect("stored");
    assert_eq!(stored.status, UserStatus::Pending);
}

#[test]
fn listing_status_accepts_rented_and_rejects_unknown() {
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let listing = seed_listing(&store, &owner, ListingStatus::Pending, "Farm", 0);
    let id = listing.id.to_string();

    assert!(matches!(
        service.set_listing_status(&admin, &id, status("sold")),
        Err(ServiceError::Validation(_))
    ));
    let unchanged = store.fetch_listing(&listing.id).expect("fetch").expect("stored");
    assert_eq!(unchanged.status, ListingStatus::Pending);

    let updated = service
        .set_listing_status(&admin, &id, status("rented"))
        .expect("status updated");
    assert_eq!(updated.status, ListingStatus::Rented);
}

#[test]
fn admin_listings_include_every_status() {
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    seed_listing(&store, &owner, ListingStatus::Pending, "Pending", 3);
    seed_listing(&store, &owner, ListingStatus::Rejected, "Rejected", 2);
    seed_listing(&store, &owner, ListingStatus::Approved, "Approved", 1);

    let listings = service.admin_listings(&admin).expect("listings");
    let titles: Vec<_> = listings
        .iter()
        .map(|view| view.listing.title.as_str())
        .collect();
    assert_eq!(titles, ["Approved", "Rejected", "Pending"]);
    assert!(listings.iter().all(|view| view.owner.is_some()));
}

#[test]
fn platform_stats_count_non_admin_accounts() {
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let farmer =
        seed_user_with_status(&store, UserRole::Farmer, UserStatus::Pending, "f1@example.com");
    seed_user_with_status(&store, UserRole::Farmer, UserStatus::Rejected, "f2@example.com");

    let listing = seed_listing(&store, &owner, ListingStatus::Approved, "Farm", 2);
    seed_listing(&store, &owner, ListingStatus::Pending, "Other", 1);
    seed_listing(&store, &owner, ListingStatus::Rented, "Leased", 0);
    seed_message(&store, &listing, &farmer, &owner, "Hello", 0);

    let stats = service.platform_stats(&admin).expect("stats");
    assert_eq!(stats.users.total, 3);
    assert_eq!(stats.users.pending, 1);
    assert_eq!(stats.users.approved, 1);
    assert_eq!(stats.users.farmers, 2);
    assert_eq!(stats.users.landowners, 1);
    assert_eq!(stats.listings.total, 3);
    assert_eq!(stats.listings.pending, 1);
    assert_eq!(stats.listings.approved, 1);
    assert_eq!(stats.messages.total, 1);
    assert_eq!(stats.transactions.total, 0);
}

#[test]
fn moderation_does_not_drop_concurrent_views() {
    const ROUNDS: u64 = 500;
    let (service, store, _) = build_service();
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com");
    let owner = seed_user(&store, UserRole::Landowner, "owner@example.com");
    let listing = seed_listing(&store, &owner, ListingStatus::Pending, "Farm", 0);
    let id = listing.id.to_string();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..ROUNDS {
                service.view_listing(&id).expect("listing found");
            }
        });
        scope.spawn(|| {
            for round in 0..ROUNDS {
                let target = if round % 2 == 0 { "approved" } else { "rented" };
                service
                    .set_listing_status(&admin, &id, status(target))
                    .expect("status updated");
            }
        });
    });

    let stored = store.fetch_listing(&listing.id).expect("fetch").expect("stored");
    assert_eq!(stored.views, ROUNDS);
    assert_eq!(stored.status, ListingStatus::Rented);
}
