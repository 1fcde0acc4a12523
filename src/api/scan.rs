//! Scan session and image decoding endpoints
//!
//! The scan session is a one-slot buffer: the barcode most recently produced
//! by a decoder (or typed in by hand) waits here until it is committed as an
//! item or cancelled. A new detection replaces the old one.

use crate::barcode;
use crate::error::{ApiError, ApiResult};
use crate::events::{AppEvent, Severity};
use crate::model::ProductInfo;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Current scan session state
#[derive(Debug, Serialize)]
pub struct ScanStateResponse {
    /// Pending barcode awaiting profile selection, if any
    pub barcode: Option<String>,
}

/// Request body for a decoded or hand-entered barcode
#[derive(Debug, Deserialize)]
pub struct SubmitBarcodeRequest {
    pub barcode: String,
}

/// Request body for image decoding: one or more base64-encoded images
#[derive(Debug, Deserialize)]
pub struct ScanImagesRequest {
    pub images: Vec<String>,
}

/// Response for image decoding
#[derive(Debug, Serialize)]
pub struct ScanImagesResponse {
    /// First barcode found in the batch, if any
    pub barcode: Option<String>,
    /// Resolved product for that barcode
    pub product: Option<ProductInfo>,
}

/// GET /api/scan
pub async fn current_scan(State(state): State<AppState>) -> Json<ScanStateResponse> {
    Json(ScanStateResponse {
        barcode: state.session.get().await,
    })
}

/// POST /api/scan
///
/// Accept a barcode from the client-side camera decoder or manual entry,
/// make it the pending scan, and resolve it to product metadata for the
/// confirmation form. Resolution is best-effort and never fails; an unknown
/// barcode comes back as the fallback record.
pub async fn submit_barcode(
    State(state): State<AppState>,
    Json(req): Json<SubmitBarcodeRequest>,
) -> ApiResult<Json<ProductInfo>> {
    let code = req.barcode.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::BadRequest("barcode must not be empty".to_string()));
    }
    if !barcode::is_well_formed(&code) {
        // Accepted anyway; the formats we validate are not exhaustive
        warn!(barcode = %code, "Submitted barcode failed format validation");
    }

    info!(barcode = %code, "Barcode submitted");
    state.session.set(Some(code.clone())).await;
    state.bus.emit(AppEvent::BarcodeDetected {
        barcode: code.clone(),
        timestamp: chrono::Utc::now(),
    });
    state.bus.notify(
        "Barcode Detected",
        &format!("Detected barcode: {}", code),
        Severity::Info,
    );

    Ok(Json(state.resolver.resolve(&code).await))
}

/// DELETE /api/scan
///
/// Discard the pending scan, returning the session to idle. Cancelling an
/// idle session is a no-op 204.
pub async fn cancel_scan(State(state): State<AppState>) -> StatusCode {
    info!("Scan cancelled");
    state.session.clear().await;
    state.bus.emit(AppEvent::ScanCancelled {
        timestamp: chrono::Utc::now(),
    });
    StatusCode::NO_CONTENT
}

/// POST /api/scan/image
///
/// Decode a batch of uploaded images, stopping at the first readable
/// barcode. Answers 503 when no decoder is configured. A batch with no
/// readable barcode is a 200 with null fields; the aggregate "No barcodes
/// found" notification has already gone out on the event stream.
pub async fn scan_images(
    State(state): State<AppState>,
    Json(req): Json<ScanImagesRequest>,
) -> ApiResult<Json<ScanImagesResponse>> {
    let Some(pipeline) = state.pipeline.clone() else {
        return Err(ApiError::Unavailable(
            "no barcode decoder is configured".to_string(),
        ));
    };
    if req.images.is_empty() {
        return Err(ApiError::BadRequest("no images provided".to_string()));
    }

    let mut images = Vec::with_capacity(req.images.len());
    for encoded in &req.images {
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ApiError::BadRequest(format!("invalid base64 image data: {}", e)))?;
        images.push(bytes);
    }

    info!(images = images.len(), "Image scan request");
    let Some(code) = pipeline.scan_batch(&images).await else {
        return Ok(Json(ScanImagesResponse {
            barcode: None,
            product: None,
        }));
    };

    state.bus.notify(
        "Barcode Detected",
        &format!("Detected barcode: {}", code),
        Severity::Info,
    );
    let product = state.resolver.resolve(&code).await;
    Ok(Json(ScanImagesResponse {
        barcode: Some(code),
        product: Some(product),
    }))
}
