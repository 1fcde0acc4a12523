//! Integration tests for the store layer over real storage backends
//!
//! The same lifecycle must hold regardless of which backend sits underneath:
//! profiles and items survive a process restart, deleting a profile removes
//! its items atomically, and a store only mutates memory after the backend
//! has confirmed the write.

use std::sync::Arc;

use tempfile::TempDir;

use giftscan::events::EventBus;
use giftscan::model::ItemDraft;
use giftscan::storage::{self, SqliteBackend, StorageBackend, StorageKind};
use giftscan::store::{ItemStore, ProfileStore, STARTER_PROFILES};

/// Test helper: in-memory SQLite backend
async fn sqlite_backend() -> Arc<dyn StorageBackend> {
    // Single connection so every query sees the same in-memory database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    Arc::new(
        SqliteBackend::from_pool(pool)
            .await
            .expect("Should initialize schema"),
    )
}

/// Test helper: wire hydrated stores over a backend
async fn stores_over(backend: Arc<dyn StorageBackend>) -> (Arc<ProfileStore>, Arc<ItemStore>) {
    let bus = EventBus::new(16);
    let items = Arc::new(ItemStore::new(backend.clone(), bus.clone()));
    let profiles = Arc::new(ProfileStore::new(backend, items.clone(), bus));
    items.hydrate().await.expect("Should hydrate items");
    profiles.hydrate().await.expect("Should hydrate profiles");
    (profiles, items)
}

fn draft(profile_id: uuid::Uuid, barcode: &str, product_name: &str) -> ItemDraft {
    ItemDraft {
        profile_id,
        barcode: barcode.to_string(),
        product_name: product_name.to_string(),
        product_image: None,
        description: None,
        price: None,
        retailer: None,
    }
}

// =============================================================================
// Profile Lifecycle Scenario
// =============================================================================

/// Empty store -> add Emma -> save an unnamed product under her -> remove her.
/// The item falls back to "Unknown Product" and dies with the profile.
async fn emma_lifecycle(backend: Arc<dyn StorageBackend>) {
    let (profiles, items) = stores_over(backend).await;

    assert!(profiles.list().await.is_empty());

    let emma = profiles.add("Emma").await.expect("Should create profile");
    let listed = profiles.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Emma");

    let item = items
        .add(draft(emma.id, "9780735211292", ""))
        .await
        .expect("Should save item");
    assert_eq!(item.product_name, "Unknown Product");
    assert_eq!(items.list_by_profile(emma.id).await.len(), 1);

    profiles.remove(emma.id).await.expect("Should remove profile");
    assert!(items.list_by_profile(emma.id).await.is_empty());
    assert!(profiles.get_by_id(emma.id).await.is_none());
}

#[tokio::test]
async fn test_profile_lifecycle_sqlite() {
    emma_lifecycle(sqlite_backend().await).await;
}

#[tokio::test]
async fn test_profile_lifecycle_file() {
    let dir = TempDir::new().unwrap();
    let backend = storage::open(StorageKind::File, dir.path())
        .await
        .expect("Should open file storage");
    emma_lifecycle(backend).await;
}

// =============================================================================
// Restart Round Trips
// =============================================================================

/// Whatever `add` returned must come back identical after a fresh reload,
/// including the fields the store assigned.
async fn reload_round_trip(kind: StorageKind) {
    let dir = TempDir::new().unwrap();

    let (saved_profile, saved_item) = {
        let backend = storage::open(kind, dir.path()).await.expect("Should open storage");
        let (profiles, items) = stores_over(backend).await;

        let profile = profiles.add("Noah").await.expect("Should create profile");
        let mut d = draft(profile.id, "5060624582615", "LEGO Star Wars Set");
        d.price = Some("$19.99".to_string());
        d.retailer = Some("Target".to_string());
        let item = items.add(d).await.expect("Should save item");
        (profile, item)
    };

    // Fresh backend over the same folder, as after a restart
    let backend = storage::open(kind, dir.path()).await.expect("Should reopen storage");
    let (profiles, items) = stores_over(backend).await;

    let reloaded_profile = profiles
        .get_by_id(saved_profile.id)
        .await
        .expect("Profile should survive reload");
    assert_eq!(reloaded_profile.name, saved_profile.name);
    assert_eq!(reloaded_profile.created_at, saved_profile.created_at);

    let reloaded_item = items
        .get_by_id(saved_item.id)
        .await
        .expect("Item should survive reload");
    assert_eq!(reloaded_item.profile_id, saved_item.profile_id);
    assert_eq!(reloaded_item.barcode, saved_item.barcode);
    assert_eq!(reloaded_item.product_name, saved_item.product_name);
    assert_eq!(reloaded_item.price.as_deref(), Some("$19.99"));
    assert_eq!(reloaded_item.retailer.as_deref(), Some("Target"));
    assert!(reloaded_item.description.is_none());
    assert_eq!(reloaded_item.date_added, saved_item.date_added);
}

#[tokio::test]
async fn test_reload_round_trip_sqlite() {
    reload_round_trip(StorageKind::Sqlite).await;
}

#[tokio::test]
async fn test_reload_round_trip_file() {
    reload_round_trip(StorageKind::File).await;
}

#[tokio::test]
async fn test_cascade_survives_reload() {
    let dir = TempDir::new().unwrap();

    let noah_id = {
        let backend = storage::open(StorageKind::File, dir.path())
            .await
            .expect("Should open storage");
        let (profiles, items) = stores_over(backend).await;

        let emma = profiles.add("Emma").await.unwrap();
        let noah = profiles.add("Noah").await.unwrap();
        items.add(draft(emma.id, "9780735211292", "Atomic Habits")).await.unwrap();
        items.add(draft(noah.id, "5060624582615", "LEGO Star Wars Set")).await.unwrap();

        profiles.remove(emma.id).await.unwrap();
        noah.id
    };

    let backend = storage::open(StorageKind::File, dir.path())
        .await
        .expect("Should reopen storage");
    let (profiles, items) = stores_over(backend).await;

    // Only Noah and his item survived the cascade
    assert_eq!(profiles.list().await.len(), 1);
    let all_items = items.list().await;
    assert_eq!(all_items.len(), 1);
    assert_eq!(all_items[0].profile_id, noah_id);
}

// =============================================================================
// Starter Profiles
// =============================================================================

#[tokio::test]
async fn test_seeding_does_not_duplicate_across_restarts() {
    let dir = TempDir::new().unwrap();

    for _ in 0..2 {
        let backend = storage::open(StorageKind::File, dir.path())
            .await
            .expect("Should open storage");
        let (profiles, _items) = stores_over(backend).await;
        profiles.seed_if_empty().await.expect("Should seed");

        let names: Vec<String> = profiles.list().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, STARTER_PROFILES);
    }
}

#[tokio::test]
async fn test_seeding_skips_populated_store() {
    let backend = sqlite_backend().await;
    let (profiles, _items) = stores_over(backend).await;

    profiles.add("Grandma").await.unwrap();
    profiles.seed_if_empty().await.expect("Should not seed");

    let names: Vec<String> = profiles.list().await.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Grandma"]);
}
