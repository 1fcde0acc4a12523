//! giftscan library - barcode gift idea tracker
//!
//! Server-side core for a mobile-oriented app that scans product barcodes,
//! resolves them to product metadata, and files the results as gift ideas
//! under named profiles.
//!
//! **Architecture:** two persistent stores (profiles, items) over a pluggable
//! storage backend, a one-slot scan session bridging decode and save, product
//! resolution behind a trait, and an HTTP/SSE surface on axum. Domain events
//! and user notifications ride a shared broadcast bus.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod barcode;
pub mod config;
pub mod error;
pub mod events;
pub mod lookup;
pub mod model;
pub mod scanner;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{ApiError, ApiResult, Result, StoreError};

use events::EventBus;
use lookup::ProductResolver;
use scanner::{BarcodeDecoder, ScanPipeline};
use session::ScanSession;
use storage::StorageBackend;
use store::{ItemStore, ProfileStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Profile collection
    pub profiles: Arc<ProfileStore>,
    /// Item collection
    pub items: Arc<ItemStore>,
    /// Pending-barcode slot
    pub session: Arc<ScanSession>,
    /// Barcode-to-product lookup
    pub resolver: Arc<dyn ProductResolver>,
    /// Image decoding, when a decoder is wired in
    pub pipeline: Option<Arc<ScanPipeline>>,
    /// Event broadcast bus
    pub bus: EventBus,
}

impl AppState {
    /// Wire stores, session, and event bus over a storage backend
    ///
    /// Hydrates both stores from storage. Seeding starter profiles is a
    /// startup decision and stays with the caller.
    pub async fn build(
        backend: Arc<dyn StorageBackend>,
        resolver: Arc<dyn ProductResolver>,
        decoder: Option<Arc<dyn BarcodeDecoder>>,
    ) -> Result<AppState> {
        let bus = EventBus::new(64);
        let session = Arc::new(ScanSession::new());
        let items = Arc::new(ItemStore::new(backend.clone(), bus.clone()));
        let profiles = Arc::new(ProfileStore::new(backend, items.clone(), bus.clone()));
        items.hydrate().await?;
        profiles.hydrate().await?;

        let pipeline =
            decoder.map(|d| Arc::new(ScanPipeline::new(d, session.clone(), bus.clone())));

        Ok(AppState {
            profiles,
            items,
            session,
            resolver,
            pipeline,
            bus,
        })
    }
}

/// Build application router
///
/// All state-changing endpoints go through the stores; handlers never touch
/// the storage backend directly.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    Router::new()
        // Health and build identification
        .route("/health", get(api::health_check))
        .route("/api/build_info", get(api::get_build_info))
        // Profile collection
        .route("/api/profiles", get(api::list_profiles))
        .route("/api/profiles", post(api::create_profile))
        .route("/api/profiles/:profile_id", get(api::get_profile))
        .route("/api/profiles/:profile_id", put(api::rename_profile))
        .route("/api/profiles/:profile_id", delete(api::delete_profile))
        .route("/api/profiles/:profile_id/items", get(api::list_profile_items))
        // Item collection
        .route("/api/items", get(api::list_items))
        .route("/api/items", post(api::save_item))
        .route("/api/items/:item_id", get(api::get_item))
        .route("/api/items/:item_id", delete(api::delete_item))
        // Scan session and decoding
        .route("/api/scan", get(api::current_scan))
        .route("/api/scan", post(api::submit_barcode))
        .route("/api/scan", delete(api::cancel_scan))
        .route("/api/scan/image", post(api::scan_images))
        // SSE event stream
        .route("/api/events", get(api::event_stream))
        .with_state(state)
        // Enable CORS for the mobile web client
        .layer(CorsLayer::permissive())
}
