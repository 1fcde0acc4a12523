//! Item store
//!
//! Owns the collection of saved barcode items, each tagged with an owning
//! profile id. Mutations persist to the backend before touching the
//! in-memory collection; the write guard is held across the backend call,
//! which also serializes overlapping mutations to this store.

use crate::error::{Result, StoreError};
use crate::events::{AppEvent, EventBus, Severity};
use crate::model::{BarcodeItem, ItemDraft, UNKNOWN_PRODUCT};
use crate::storage::StorageBackend;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ItemStore {
    items: RwLock<Vec<BarcodeItem>>,
    backend: Arc<dyn StorageBackend>,
    bus: EventBus,
}

impl ItemStore {
    pub fn new(backend: Arc<dyn StorageBackend>, bus: EventBus) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            backend,
            bus,
        }
    }

    /// Load the persisted collection into memory
    pub async fn hydrate(&self) -> Result<()> {
        let loaded = self.backend.load_items().await?;
        let mut items = self.items.write().await;
        info!("Hydrated {} items", loaded.len());
        *items = loaded;
        Ok(())
    }

    /// All items, in creation order
    pub async fn list(&self) -> Vec<BarcodeItem> {
        self.items.read().await.clone()
    }

    /// Items owned by one profile; empty if none
    ///
    /// Linear scan over the collection, fine at the expected cardinality
    /// (tens to low hundreds of items).
    pub async fn list_by_profile(&self, profile_id: Uuid) -> Vec<BarcodeItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|i| i.profile_id == profile_id)
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<BarcodeItem> {
        self.items.read().await.iter().find(|i| i.id == id).cloned()
    }

    /// Commit a draft into the collection
    ///
    /// The barcode must be non-empty; a blank product name falls back to
    /// "Unknown Product". Returns the created item only once it is durably
    /// persisted.
    pub async fn add(&self, draft: ItemDraft) -> Result<BarcodeItem> {
        let barcode = draft.barcode.trim();
        if barcode.is_empty() {
            return Err(StoreError::Validation(
                "item barcode must not be empty".to_string(),
            ));
        }

        let product_name = draft.product_name.trim();
        let normalized = ItemDraft {
            barcode: barcode.to_string(),
            product_name: if product_name.is_empty() {
                UNKNOWN_PRODUCT.to_string()
            } else {
                product_name.to_string()
            },
            ..draft
        };
        let item = BarcodeItem::from_draft(normalized);

        let mut items = self.items.write().await;
        if let Err(err) = self.backend.insert_item(&item).await {
            warn!("Failed to persist item {}: {}", item.id, err);
            self.bus.notify(
                "Save failed",
                "The gift idea could not be saved",
                Severity::Error,
            );
            return Err(err);
        }
        items.push(item.clone());

        self.bus.emit(AppEvent::ItemSaved {
            item_id: item.id,
            profile_id: item.profile_id,
            product_name: item.product_name.clone(),
            timestamp: chrono::Utc::now(),
        });

        Ok(item)
    }

    /// Delete by id; removing a missing id is a no-op, not an error
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let mut items = self.items.write().await;
        if !items.iter().any(|i| i.id == id) {
            return Ok(());
        }

        if let Err(err) = self.backend.delete_item(id).await {
            warn!("Failed to delete item {}: {}", id, err);
            self.bus.notify(
                "Delete failed",
                "The item could not be removed",
                Severity::Error,
            );
            return Err(err);
        }
        items.retain(|i| i.id != id);

        self.bus.emit(AppEvent::ItemRemoved {
            item_id: id,
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }

    /// Drop a profile's items from the in-memory collection, returning how
    /// many were evicted
    ///
    /// Durable removal is the backend's delete cascade; this only brings
    /// memory in line after that cascade has been confirmed.
    pub(crate) async fn evict_profile(&self, profile_id: Uuid) -> usize {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.profile_id != profile_id);
        before - items.len()
    }
}
