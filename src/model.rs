//! Core data model
//!
//! Two persisted collections: profiles and barcode items, related 1:N.
//! Deleting a profile removes its dependent items; an item never outlives
//! the profile it references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used when product resolution yields nothing
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// A named beneficiary for whom gift ideas are collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    /// Non-empty display string, user-editable post-creation
    pub name: String,
    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile with a fresh id and creation timestamp
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Product metadata produced by barcode resolution
///
/// Optional fields are genuinely absent when resolution has nothing for
/// them; "no price" is distinct from "price is an empty string".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub barcode: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub retailer: Option<String>,
}

impl ProductInfo {
    /// Minimal record returned when no product data could be found
    pub fn fallback(barcode: &str) -> Self {
        Self {
            barcode: barcode.to_string(),
            product_name: UNKNOWN_PRODUCT.to_string(),
            product_image: None,
            description: Some("No details available for this barcode".to_string()),
            price: None,
            retailer: None,
        }
    }
}

/// An item under construction: resolved product data plus the profile it
/// will be saved under, before the store assigns identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub profile_id: Uuid,
    pub barcode: String,
    #[serde(default)]
    pub product_name: String,
    pub product_image: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub retailer: Option<String>,
}

impl ItemDraft {
    /// Build a draft from a resolved product and a chosen profile
    pub fn from_product(profile_id: Uuid, product: ProductInfo) -> Self {
        Self {
            profile_id,
            barcode: product.barcode,
            product_name: product.product_name,
            product_image: product.product_image,
            description: product.description,
            price: product.price,
            retailer: product.retailer,
        }
    }
}

/// A saved product record associated with one profile and one scanned barcode
///
/// Never mutated in place after creation; removed only by explicit delete
/// or by the owning profile's cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeItem {
    pub id: Uuid,
    /// Owning profile; set at creation, immutable thereafter
    pub profile_id: Uuid,
    /// The decoded scan string; immutable
    pub barcode: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub retailer: Option<String>,
    /// Creation timestamp, immutable
    pub date_added: DateTime<Utc>,
}

impl BarcodeItem {
    /// Materialize a draft into a stored item, assigning id and timestamp
    pub fn from_draft(draft: ItemDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id: draft.profile_id,
            barcode: draft.barcode,
            product_name: draft.product_name,
            product_image: draft.product_image,
            description: draft.description,
            price: draft.price,
            retailer: draft.retailer,
            date_added: Utc::now(),
        }
    }
}
