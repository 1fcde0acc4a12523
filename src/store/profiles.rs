//! Profile store
//!
//! Owns the set of named profiles. Deleting a profile cascades to the
//! items that reference it: the backend removes profile and items in one
//! durable step, then the in-memory collections follow.

use crate::error::{Result, StoreError};
use crate::events::{AppEvent, EventBus, Severity};
use crate::model::Profile;
use crate::storage::StorageBackend;
use crate::store::ItemStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Profiles created on first run so the app is not empty on arrival
pub const STARTER_PROFILES: [&str; 2] = ["Emma", "Noah"];

pub struct ProfileStore {
    profiles: RwLock<Vec<Profile>>,
    backend: Arc<dyn StorageBackend>,
    /// Cascade collaborator: evicts a removed profile's items from memory
    items: Arc<ItemStore>,
    bus: EventBus,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn StorageBackend>, items: Arc<ItemStore>, bus: EventBus) -> Self {
        Self {
            profiles: RwLock::new(Vec::new()),
            backend,
            items,
            bus,
        }
    }

    /// Load the persisted collection into memory
    pub async fn hydrate(&self) -> Result<()> {
        let loaded = self.backend.load_profiles().await?;
        let mut profiles = self.profiles.write().await;
        info!("Hydrated {} profiles", loaded.len());
        *profiles = loaded;
        Ok(())
    }

    /// Populate the starter profiles when the collection is empty
    pub async fn seed_if_empty(&self) -> Result<()> {
        if !self.profiles.read().await.is_empty() {
            return Ok(());
        }
        for name in STARTER_PROFILES {
            self.add(name).await?;
        }
        info!("Seeded {} starter profiles", STARTER_PROFILES.len());
        Ok(())
    }

    /// All profiles, in creation order
    pub async fn list(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<Profile> {
        self.profiles.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Create a profile; the name must not trim to empty
    ///
    /// Returns the created profile only once it is durably persisted.
    pub async fn add(&self, name: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "profile name must not be empty".to_string(),
            ));
        }

        let profile = Profile::new(name.to_string());

        let mut profiles = self.profiles.write().await;
        if let Err(err) = self.backend.insert_profile(&profile).await {
            warn!("Failed to persist profile '{}': {}", name, err);
            self.bus.notify(
                "Save failed",
                "The profile could not be created",
                Severity::Error,
            );
            return Err(err);
        }
        profiles.push(profile.clone());

        self.bus.emit(AppEvent::ProfileCreated {
            profile_id: profile.id,
            name: profile.name.clone(),
            timestamp: chrono::Utc::now(),
        });

        Ok(profile)
    }

    /// Rename a profile in place
    ///
    /// Renaming to the current name performs no write. An unknown id, a
    /// blank name, or a persistence failure is logged and otherwise
    /// swallowed; the collection is left as it was.
    pub async fn rename(&self, id: Uuid, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            warn!("Ignoring rename of profile {} to a blank name", id);
            return;
        }

        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.iter_mut().find(|p| p.id == id) else {
            warn!("Ignoring rename of unknown profile {}", id);
            return;
        };
        if profile.name == name {
            return;
        }

        match self.backend.rename_profile(id, name).await {
            Ok(()) => {
                profile.name = name.to_string();
                self.bus.emit(AppEvent::ProfileRenamed {
                    profile_id: id,
                    name: name.to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(err) => {
                warn!("Failed to persist rename of profile {}: {}", id, err);
            }
        }
    }

    /// Delete a profile and every item it owns
    ///
    /// Idempotent: removing a nonexistent id is a no-op, not an error.
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        if !profiles.iter().any(|p| p.id == id) {
            return Ok(());
        }

        if let Err(err) = self.backend.delete_profile(id).await {
            warn!("Failed to delete profile {}: {}", id, err);
            self.bus.notify(
                "Delete failed",
                "The profile could not be removed",
                Severity::Error,
            );
            return Err(err);
        }
        profiles.retain(|p| p.id != id);
        let items_removed = self.items.evict_profile(id).await;

        self.bus.emit(AppEvent::ProfileRemoved {
            profile_id: id,
            items_removed,
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDraft, ProductInfo};
    use crate::storage::SqliteBackend;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_stores() -> (ProfileStore, Arc<ItemStore>, EventBus) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        let backend: Arc<dyn StorageBackend> =
            Arc::new(SqliteBackend::from_pool(pool).await.expect("schema"));
        let bus = EventBus::new(16);
        let items = Arc::new(ItemStore::new(backend.clone(), bus.clone()));
        let profiles = ProfileStore::new(backend, items.clone(), bus.clone());
        (profiles, items, bus)
    }

    #[tokio::test]
    async fn test_add_trims_and_persists() {
        let (profiles, _items, _bus) = test_stores().await;

        let created = profiles.add("  Emma  ").await.unwrap();
        assert_eq!(created.name, "Emma");

        let listed = profiles.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn test_add_blank_name_is_validation_error() {
        let (profiles, _items, _bus) = test_stores().await;

        let result = profiles.add("   ").await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(profiles.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_rename_same_name_keeps_created_at() {
        let (profiles, _items, _bus) = test_stores().await;

        let created = profiles.add("Emma").await.unwrap();
        profiles.rename(created.id, "Emma").await;

        let after = profiles.get_by_id(created.id).await.unwrap();
        assert_eq!(after.name, "Emma");
        assert_eq!(after.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_rename_unknown_or_blank_is_silent() {
        let (profiles, _items, _bus) = test_stores().await;

        let created = profiles.add("Emma").await.unwrap();
        profiles.rename(Uuid::new_v4(), "Ghost").await;
        profiles.rename(created.id, "   ").await;

        let after = profiles.get_by_id(created.id).await.unwrap();
        assert_eq!(after.name, "Emma");
    }

    #[tokio::test]
    async fn test_rename_updates_in_place() {
        let (profiles, _items, _bus) = test_stores().await;

        let created = profiles.add("Emma").await.unwrap();
        profiles.rename(created.id, "Emilia").await;

        let after = profiles.get_by_id(created.id).await.unwrap();
        assert_eq!(after.name, "Emilia");
        assert_eq!(after.created_at, created.created_at);
        assert_eq!(profiles.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_cascades_to_items() {
        let (profiles, items, _bus) = test_stores().await;

        let emma = profiles.add("Emma").await.unwrap();
        let noah = profiles.add("Noah").await.unwrap();
        items
            .add(ItemDraft::from_product(emma.id, ProductInfo::fallback("96385074")))
            .await
            .unwrap();
        items
            .add(ItemDraft::from_product(noah.id, ProductInfo::fallback("5060624582615")))
            .await
            .unwrap();

        profiles.remove(emma.id).await.unwrap();

        assert!(profiles.get_by_id(emma.id).await.is_none());
        assert!(items.list_by_profile(emma.id).await.is_empty());
        assert_eq!(items.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let (profiles, _items, _bus) = test_stores().await;
        profiles.remove(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_seed_if_empty_only_seeds_once() {
        let (profiles, _items, _bus) = test_stores().await;

        profiles.seed_if_empty().await.unwrap();
        let names: Vec<String> = profiles.list().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Emma".to_string(), "Noah".to_string()]);

        profiles.seed_if_empty().await.unwrap();
        assert_eq!(profiles.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_emits_cascade_count() {
        let (profiles, items, bus) = test_stores().await;
        let mut rx = bus.subscribe();

        let emma = profiles.add("Emma").await.unwrap();
        for _ in 0..2 {
            items
                .add(ItemDraft::from_product(emma.id, ProductInfo::fallback("96385074")))
                .await
                .unwrap();
        }
        profiles.remove(emma.id).await.unwrap();

        let mut removed_event = None;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::ProfileRemoved { items_removed, .. } = event {
                removed_event = Some(items_removed);
            }
        }
        assert_eq!(removed_event, Some(2));
    }
}
