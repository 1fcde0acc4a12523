//! Durable storage backends
//!
//! Two equivalent realizations of one contract, selected at composition
//! time: [`SqliteBackend`] (structured store, per-row operations, foreign
//! key cascade) and [`JsonFileBackend`] (one JSON document keyed by
//! collection name, read whole at open and rewritten whole on every
//! mutation). The stores only mutate their in-memory collections after a
//! backend call returns success, so `delete_profile` must remove the
//! profile and its dependent items in a single durable step under both
//! backends.

mod file;
mod sqlite;

pub use file::JsonFileBackend;
pub use sqlite::SqliteBackend;

use crate::error::Result;
use crate::model::{BarcodeItem, Profile};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Durable storage for the two persisted collections
///
/// All operations are idempotent on missing rows: deleting an id that is
/// not present succeeds without effect.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// All persisted profiles, in creation order
    async fn load_profiles(&self) -> Result<Vec<Profile>>;

    /// All persisted items, in creation order
    async fn load_items(&self) -> Result<Vec<BarcodeItem>>;

    async fn insert_profile(&self, profile: &Profile) -> Result<()>;

    async fn rename_profile(&self, id: Uuid, name: &str) -> Result<()>;

    /// Delete the profile and every item referencing it, atomically
    async fn delete_profile(&self, id: Uuid) -> Result<()>;

    async fn insert_item(&self, item: &BarcodeItem) -> Result<()>;

    async fn delete_item(&self, id: Uuid) -> Result<()>;

    /// Query the durable state for items owned by one profile
    async fn items_for_profile(&self, profile_id: Uuid) -> Result<Vec<BarcodeItem>>;
}

/// Backend selection, resolved from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    File,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Sqlite => "sqlite",
            StorageKind::File => "file",
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "file" => Ok(StorageKind::File),
            other => Err(format!(
                "unknown storage kind '{}' (expected 'sqlite' or 'file')",
                other
            )),
        }
    }
}

/// Open the configured backend inside the data directory
pub async fn open(kind: StorageKind, data_dir: &Path) -> Result<Arc<dyn StorageBackend>> {
    match kind {
        StorageKind::Sqlite => {
            let backend = SqliteBackend::open(&data_dir.join("giftscan.db")).await?;
            Ok(Arc::new(backend))
        }
        StorageKind::File => {
            let backend = JsonFileBackend::open(&data_dir.join("store.json"))?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_from_str() {
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!(" File ".parse::<StorageKind>().unwrap(), StorageKind::File);
        assert!("localstorage".parse::<StorageKind>().is_err());
    }
}
