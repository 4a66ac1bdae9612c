//! Read-through caching and whole-cache invalidation, exercised at the
//! catalog-service level against an instrumented in-memory store.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use rust_decimal::Decimal;

use listino::application::catalog::{CatalogService, CreateItemCommand, UpdateItemCommand};
use listino::application::filter::ItemFilter;
use listino::application::pagination::PageRequest;

use common::{InMemoryItems, catalog_with_cache};

const ACTOR: &str = "api_key";

fn dec(value: &str) -> Decimal {
    value.parse().expect("test decimal parses")
}

fn create_command(name: &str, price: &str) -> CreateItemCommand {
    CreateItemCommand {
        name: name.to_string(),
        description: format!("{name} description"),
        price: dec(price),
    }
}

#[tokio::test]
async fn repeated_point_reads_hit_the_cache() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, _cache) = catalog_with_cache(repo.clone());

    let created = service
        .create_item(ACTOR, create_command("cached", "9.99"))
        .await
        .expect("create succeeds");

    for _ in 0..3 {
        let fetched = service
            .find_by_id(created.id)
            .await
            .expect("get succeeds")
            .expect("item present");
        assert_eq!(fetched, created);
    }

    // First read populated the cache; the two repeats never reached the store.
    assert_eq!(repo.find_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mutations_invalidate_point_reads() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, cache) = catalog_with_cache(repo.clone());

    let created = service
        .create_item(ACTOR, create_command("stale", "9.99"))
        .await
        .expect("create succeeds");

    service
        .find_by_id(created.id)
        .await
        .expect("get succeeds")
        .expect("item present");
    assert_eq!(cache.len(), 1);

    let updated = service
        .update_item(
            ACTOR,
            UpdateItemCommand {
                id: created.id,
                name: "fresh".to_string(),
                description: "replaced".to_string(),
                price: dec("4.75"),
            },
        )
        .await
        .expect("update succeeds");
    assert!(cache.is_empty());

    let fetched = service
        .find_by_id(created.id)
        .await
        .expect("get succeeds")
        .expect("item present");
    assert_eq!(fetched, updated);
    assert_eq!(fetched.name, "fresh");
    assert_eq!(fetched.price, dec("4.75"));
}

#[tokio::test]
async fn listing_reads_are_cached_per_filter_and_page() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, _cache) = catalog_with_cache(repo.clone());

    service
        .create_item(ACTOR, create_command("only", "9.99"))
        .await
        .expect("create succeeds");
    let baseline = repo.list_calls.load(Ordering::SeqCst);

    let filter = ItemFilter {
        price_less_than: Some(dec("15")),
        ..Default::default()
    };
    let page = PageRequest::new(0, 10).expect("valid request");

    let first = service.list(&filter, page).await.expect("list succeeds");
    let second = service.list(&filter, page).await.expect("list succeeds");
    assert_eq!(first, second);
    assert_eq!(repo.list_calls.load(Ordering::SeqCst), baseline + 1);

    // A different page request is its own cache entry.
    let other_page = PageRequest::new(1, 10).expect("valid request");
    service
        .list(&filter, other_page)
        .await
        .expect("list succeeds");
    assert_eq!(repo.list_calls.load(Ordering::SeqCst), baseline + 2);

    // So is a different filter.
    let unfiltered = ItemFilter::default();
    service
        .list(&unfiltered, page)
        .await
        .expect("list succeeds");
    assert_eq!(repo.list_calls.load(Ordering::SeqCst), baseline + 3);
}

#[tokio::test]
async fn listings_never_serve_stale_results_after_a_write() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, _cache) = catalog_with_cache(repo.clone());

    service
        .create_item(ACTOR, create_command("first", "9.99"))
        .await
        .expect("create succeeds");

    let filter = ItemFilter::default();
    let page = PageRequest::new(0, 10).expect("valid request");

    let before = service.list(&filter, page).await.expect("list succeeds");
    assert_eq!(before.total, 1);

    service
        .create_item(ACTOR, create_command("second", "19.99"))
        .await
        .expect("create succeeds");

    let after = service.list(&filter, page).await.expect("list succeeds");
    assert_eq!(after.total, 2);
}

#[tokio::test]
async fn deletes_invalidate_cached_reads() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, _cache) = catalog_with_cache(repo.clone());

    let created = service
        .create_item(ACTOR, create_command("doomed", "9.99"))
        .await
        .expect("create succeeds");

    service
        .find_by_id(created.id)
        .await
        .expect("get succeeds")
        .expect("item present");

    service
        .delete_item(ACTOR, created.id)
        .await
        .expect("delete succeeds");

    let fetched = service.find_by_id(created.id).await.expect("get succeeds");
    assert!(fetched.is_none());
}

#[tokio::test]
async fn absent_reads_are_not_cached() {
    let repo = Arc::new(InMemoryItems::new());
    let (service, cache) = catalog_with_cache(repo.clone());

    let missing = uuid::Uuid::new_v4();
    assert!(
        service
            .find_by_id(missing)
            .await
            .expect("get succeeds")
            .is_none()
    );
    assert!(cache.is_empty());
    // Absence keeps hitting the store rather than pinning a negative entry.
    assert!(
        service
            .find_by_id(missing)
            .await
            .expect("get succeeds")
            .is_none()
    );
    assert_eq!(repo.find_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_without_a_cache_goes_straight_to_the_store() {
    let repo = Arc::new(InMemoryItems::new());
    let service = CatalogService::new(repo.clone());

    let created = service
        .create_item(ACTOR, create_command("direct", "9.99"))
        .await
        .expect("create succeeds");

    service
        .find_by_id(created.id)
        .await
        .expect("get succeeds")
        .expect("item present");
    service
        .find_by_id(created.id)
        .await
        .expect("get succeeds")
        .expect("item present");

    assert_eq!(repo.find_calls.load(Ordering::SeqCst), 2);
}
