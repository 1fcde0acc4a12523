//! SQLite storage backend
//!
//! Structured realization of the storage contract: per-row create/read/
//! delete plus query-by-profile. The profile cascade is enforced by the
//! schema (`ON DELETE CASCADE`), so deleting a profile row removes its
//! items in the same durable step.

use crate::error::Result;
use crate::model::{BarcodeItem, Profile};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (or create) the database file and ensure the schema exists
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_str = db_path.to_str().ok_or_else(|| {
            crate::error::StoreError::Persistence(format!(
                "database path is not valid UTF-8: {}",
                db_path.display()
            ))
        })?;

        // foreign_keys is a per-connection pragma; setting it through the
        // connect options applies it to every pooled connection, which the
        // delete cascade depends on
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::from_str(db_str)
                    .map_err(sqlx::Error::from)?
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(Duration::from_millis(5000)),
            )
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying pragmas and schema
    ///
    /// Used with in-memory databases in tests; pass a single-connection
    /// pool so the pragma and the schema live on the same connection.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

        create_profiles_table(&pool).await?;
        create_items_table(&pool).await?;

        Ok(Self { pool })
    }
}

async fn create_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            CHECK (length(name) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            barcode TEXT NOT NULL,
            product_name TEXT NOT NULL,
            product_image TEXT,
            description TEXT,
            price TEXT,
            retailer TEXT,
            date_added TIMESTAMP NOT NULL,
            CHECK (length(barcode) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_profile_id ON items(profile_id)")
        .execute(pool)
        .await?;

    Ok(())
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
    let id: String = row.get("id");
    Ok(Profile {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        created_at: row.get("created_at"),
    })
}

fn item_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<BarcodeItem> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    Ok(BarcodeItem {
        id: Uuid::parse_str(&id)?,
        profile_id: Uuid::parse_str(&profile_id)?,
        barcode: row.get("barcode"),
        product_name: row.get("product_name"),
        product_image: row.get("product_image"),
        description: row.get("description"),
        price: row.get("price"),
        retailer: row.get("retailer"),
        date_added: row.get("date_added"),
    })
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn load_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at FROM profiles ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn load_items(&self) -> Result<Vec<BarcodeItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, barcode, product_name, product_image,
                   description, price, retailer, date_added
            FROM items
            ORDER BY date_added ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query("INSERT INTO profiles (id, name, created_at) VALUES (?, ?, ?)")
            .bind(profile.id.to_string())
            .bind(&profile.name)
            .bind(profile.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn rename_profile(&self, id: Uuid, name: &str) -> Result<()> {
        // Zero rows affected (missing id) is not an error here; the store
        // layer decides how to report it
        sqlx::query("UPDATE profiles SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_item(&self, item: &BarcodeItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, profile_id, barcode, product_name, product_image,
                               description, price, retailer, date_added)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.profile_id.to_string())
        .bind(&item.barcode)
        .bind(&item.product_name)
        .bind(&item.product_image)
        .bind(&item.description)
        .bind(&item.price)
        .bind(&item.retailer)
        .bind(item.date_added)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_item(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn items_for_profile(&self, profile_id: Uuid) -> Result<Vec<BarcodeItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, barcode, product_name, product_image,
                   description, price, retailer, date_added
            FROM items
            WHERE profile_id = ?
            ORDER BY date_added ASC, id ASC
            "#,
        )
        .bind(profile_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }
}
