//! JSON file storage backend
//!
//! Local key-value realization of the storage contract: one JSON document
//! holding both collections keyed by name, read whole at open and rewritten
//! whole (temp file + rename) on every mutation. The whole-document write
//! makes the profile cascade atomic: the profile row and its dependent
//! items disappear in the same rename.

use crate::error::{Result, StoreError};
use crate::model::{BarcodeItem, Profile};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// The persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    items: Vec<BarcodeItem>,
}

pub struct JsonFileBackend {
    path: PathBuf,
    doc: Mutex<StoreDocument>,
}

impl JsonFileBackend {
    /// Open the store file, or start empty if none exists yet
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let doc = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let doc: StoreDocument = serde_json::from_str(&raw)?;
            info!(
                "Opened store file {} ({} profiles, {} items)",
                path.display(),
                doc.profiles.len(),
                doc.items.len()
            );
            doc
        } else {
            info!("No store file at {}, starting empty", path.display());
            StoreDocument::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            doc: Mutex::new(doc),
        })
    }

    /// Write the whole document durably: temp file in the same directory,
    /// then rename over the target
    fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn load_profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.doc.lock().await.profiles.clone())
    }

    async fn load_items(&self) -> Result<Vec<BarcodeItem>> {
        Ok(self.doc.lock().await.items.clone())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        next.profiles.push(profile.clone());
        // The cached document only advances once the write has landed, so
        // a failed write cannot leave memory ahead of disk
        self.write_document(&next)?;
        *doc = next;
        Ok(())
    }

    async fn rename_profile(&self, id: Uuid, name: &str) -> Result<()> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        let Some(profile) = next.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(());
        };
        profile.name = name.to_string();
        self.write_document(&next)?;
        *doc = next;
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<()> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        let before = (next.profiles.len(), next.items.len());
        next.profiles.retain(|p| p.id != id);
        next.items.retain(|i| i.profile_id != id);
        if (next.profiles.len(), next.items.len()) == before {
            return Ok(());
        }
        self.write_document(&next)?;
        *doc = next;
        Ok(())
    }

    async fn insert_item(&self, item: &BarcodeItem) -> Result<()> {
        let mut doc = self.doc.lock().await;
        // Same referential guard the SQLite schema enforces
        if !doc.profiles.iter().any(|p| p.id == item.profile_id) {
            return Err(StoreError::Persistence(format!(
                "item references missing profile {}",
                item.profile_id
            )));
        }
        let mut next = doc.clone();
        next.items.push(item.clone());
        self.write_document(&next)?;
        *doc = next;
        Ok(())
    }

    async fn delete_item(&self, id: Uuid) -> Result<()> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        let before = next.items.len();
        next.items.retain(|i| i.id != id);
        if next.items.len() == before {
            return Ok(());
        }
        self.write_document(&next)?;
        *doc = next;
        Ok(())
    }

    async fn items_for_profile(&self, profile_id: Uuid) -> Result<Vec<BarcodeItem>> {
        let doc = self.doc.lock().await;
        Ok(doc
            .items
            .iter()
            .filter(|i| i.profile_id == profile_id)
            .cloned()
            .collect())
    }
}
