//! HTTP API handlers
//!
//! Thin layer over the stores: extract, delegate, translate errors into the
//! JSON error envelope. Success notifications for user-visible actions are
//! emitted here; failure notifications come from the store layer.

pub mod health;
pub mod items;
pub mod profiles;
pub mod scan;
pub mod sse;

pub use health::{get_build_info, health_check};
pub use items::{delete_item, get_item, list_items, save_item};
pub use profiles::{
    create_profile, delete_profile, get_profile, list_profile_items, list_profiles, rename_profile,
};
pub use scan::{cancel_scan, current_scan, scan_images, submit_barcode};
pub use sse::event_stream;
