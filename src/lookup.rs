//! Product resolution
//!
//! Turns a decoded barcode into displayable product metadata. Resolution is
//! total: every well-formed barcode yields a [`ProductInfo`], falling back to
//! a minimal "Unknown Product" record when no source has data. Callers never
//! see an error from this layer; a failed lookup is a fallback, not a fault.
//!
//! Two resolvers:
//! - [`CatalogResolver`] answers from a small built-in catalog, offline.
//! - [`RemoteResolver`] additionally queries the Open Food Facts API, with
//!   polite request spacing and a hard timeout. Network trouble degrades to
//!   the same fallback record the catalog resolver produces.

use crate::barcode;
use crate::model::ProductInfo;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Open Food Facts API base URL
const OPENFOODFACTS_API_URL: &str = "https://world.openfoodfacts.org/api/v2";

/// Default timeout for remote lookup requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum spacing between consecutive remote requests
const REQUEST_SPACING: Duration = Duration::from_millis(500);

/// User-Agent header (required by Open Food Facts)
const USER_AGENT: &str = "giftscan/0.1.0 (https://github.com/yourusername/giftscan)";

/// Source of product metadata for decoded barcodes
///
/// Implementations must be total: `resolve` always returns a record, using
/// [`ProductInfo::fallback`] when nothing better is available.
#[async_trait]
pub trait ProductResolver: Send + Sync {
    /// Resolver name for logs
    fn name(&self) -> &'static str;

    /// Resolve a barcode to product metadata
    async fn resolve(&self, barcode: &str) -> ProductInfo;
}

/// Which resolver implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// Built-in catalog only, no network
    Catalog,
    /// Catalog first, then Open Food Facts
    Remote,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverKind::Catalog => "catalog",
            ResolverKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(ResolverKind::Catalog),
            "remote" => Ok(ResolverKind::Remote),
            other => Err(format!(
                "unknown resolver kind '{}' (expected 'catalog' or 'remote')",
                other
            )),
        }
    }
}

/// Construct the resolver selected by configuration
pub fn build(kind: ResolverKind) -> Arc<dyn ProductResolver> {
    match kind {
        ResolverKind::Catalog => Arc::new(CatalogResolver::new()),
        ResolverKind::Remote => Arc::new(RemoteResolver::new()),
    }
}

/// Known products shipped with the application
///
/// Catalog hits take priority over remote lookup so the bundled demo
/// barcodes resolve identically with or without network access.
fn catalog_entry(barcode: &str) -> Option<ProductInfo> {
    match barcode {
        "9780735211292" => Some(ProductInfo {
            barcode: barcode.to_string(),
            product_name: "Atomic Habits".to_string(),
            product_image: Some(
                "https://m.media-amazon.com/images/I/81wgcld4wxL._AC_UF1000,1000_QL80_.jpg"
                    .to_string(),
            ),
            description: Some(
                "An Easy & Proven Way to Build Good Habits & Break Bad Ones".to_string(),
            ),
            price: Some("$11.98".to_string()),
            retailer: Some("Amazon".to_string()),
        }),
        "5060624582615" => Some(ProductInfo {
            barcode: barcode.to_string(),
            product_name: "LEGO Star Wars Set".to_string(),
            product_image: Some(
                "https://m.media-amazon.com/images/I/81wId1U0gnL._AC_SL1500_.jpg".to_string(),
            ),
            description: Some("Building set with popular Star Wars character".to_string()),
            price: Some("$19.99".to_string()),
            retailer: Some("Target".to_string()),
        }),
        _ => None,
    }
}

/// Offline resolver backed by the built-in catalog
pub struct CatalogResolver;

impl CatalogResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CatalogResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductResolver for CatalogResolver {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn resolve(&self, barcode: &str) -> ProductInfo {
        match catalog_entry(barcode) {
            Some(info) => {
                debug!(barcode = %barcode, product = %info.product_name, "Catalog hit");
                info
            }
            None => {
                debug!(barcode = %barcode, "Catalog miss, returning fallback record");
                ProductInfo::fallback(barcode)
            }
        }
    }
}

/// Resolver that consults the catalog, then Open Food Facts
///
/// Remote failures of any kind (network, non-2xx status, parse) degrade to
/// the fallback record. Requests are spaced at least [`REQUEST_SPACING`]
/// apart; Open Food Facts asks clients to stay well under their rate limits.
pub struct RemoteResolver {
    /// HTTP client for API requests
    http_client: Client,
    /// Request spacing (last request time)
    rate_limiter: Arc<Mutex<Option<Instant>>>,
}

impl RemoteResolver {
    /// Create a new remote resolver
    pub fn new() -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            rate_limiter: Arc::new(Mutex::new(None)),
        }
    }

    /// Sleep as needed to keep requests at least REQUEST_SPACING apart
    async fn enforce_spacing(&self) {
        let mut last_request = self.rate_limiter.lock().await;

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < REQUEST_SPACING {
                let sleep_duration = REQUEST_SPACING - elapsed;
                debug!(
                    sleep_ms = sleep_duration.as_millis(),
                    "Spacing out product lookup request"
                );
                sleep(sleep_duration).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    /// Query Open Food Facts for a barcode
    ///
    /// Returns `Ok(None)` when the product is not in their database, `Err`
    /// for transport or parse problems. The caller folds both into the
    /// fallback record.
    async fn query_product(&self, barcode: &str) -> Result<Option<ProductInfo>, reqwest::Error> {
        self.enforce_spacing().await;

        let url = format!("{}/product/{}.json", OPENFOODFACTS_API_URL, barcode);
        debug!(barcode = %barcode, "Querying Open Food Facts");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            // 404 means "not in the database", which is a miss, not a fault
            debug!(barcode = %barcode, status = %response.status(), "Lookup returned non-success status");
            return Ok(None);
        }

        let body: OffResponse = response.json().await?;
        if body.status != 1 {
            return Ok(None);
        }

        let Some(product) = body.product else {
            return Ok(None);
        };
        let Some(name) = product.product_name.filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(ProductInfo {
            barcode: barcode.to_string(),
            product_name: name,
            product_image: product.image_url,
            description: product.generic_name.filter(|d| !d.trim().is_empty()),
            // Open Food Facts carries no pricing or retailer data
            price: None,
            retailer: None,
        }))
    }
}

impl Default for RemoteResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductResolver for RemoteResolver {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn resolve(&self, barcode: &str) -> ProductInfo {
        if let Some(info) = catalog_entry(barcode) {
            debug!(barcode = %barcode, product = %info.product_name, "Catalog hit");
            return info;
        }

        // Malformed codes never reach the network
        if !barcode::is_well_formed(barcode) {
            debug!(barcode = %barcode, "Barcode not well-formed, skipping remote lookup");
            return ProductInfo::fallback(barcode);
        }

        match self.query_product(barcode).await {
            Ok(Some(info)) => {
                debug!(barcode = %barcode, product = %info.product_name, "Remote lookup hit");
                info
            }
            Ok(None) => {
                debug!(barcode = %barcode, "Remote lookup miss, returning fallback record");
                ProductInfo::fallback(barcode)
            }
            Err(e) => {
                warn!(barcode = %barcode, error = %e, "Remote lookup failed, returning fallback record");
                ProductInfo::fallback(barcode)
            }
        }
    }
}

// ============================================================================
// Open Food Facts API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OffResponse {
    /// 1 when the product exists, 0 otherwise
    status: u8,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    generic_name: Option<String>,
    image_url: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
