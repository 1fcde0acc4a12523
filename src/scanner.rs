//! Image scanning pipeline
//!
//! Bridges an external barcode decoder to the scan session. The decoder is a
//! boundary trait: implementations wrap whatever library or service actually
//! reads pixels. The pipeline owns the surrounding policy, which images feed
//! the session, what gets logged, and when the user hears about an empty
//! batch.
//!
//! A decoder miss (`Ok(None)`) is a normal negative result. It is logged per
//! image and surfaced to the user at most once per batch, as an aggregate
//! "No barcodes found" notification. Only a decoder fault is an error.

use crate::barcode;
use crate::error::DecodeError;
use crate::events::{AppEvent, EventBus, Severity};
use crate::session::ScanSession;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// External capability turning image bytes into a barcode text string
///
/// `Ok(None)` means "no code in this image", which callers must treat as a
/// normal outcome. `Err` is reserved for unreadable input or a decoder fault.
#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    /// Decoder name for logs
    fn name(&self) -> &'static str;

    /// Attempt to read one barcode from encoded image bytes
    async fn decode_image(
        &self,
        image: &[u8],
    ) -> std::result::Result<Option<String>, DecodeError>;
}

/// Decode uploads, feed hits into the scan session, report empty batches
pub struct ScanPipeline {
    decoder: Arc<dyn BarcodeDecoder>,
    session: Arc<ScanSession>,
    bus: EventBus,
}

impl ScanPipeline {
    pub fn new(decoder: Arc<dyn BarcodeDecoder>, session: Arc<ScanSession>, bus: EventBus) -> Self {
        Self {
            decoder,
            session,
            bus,
        }
    }

    /// Decode a single image and, on a hit, make it the pending barcode
    ///
    /// Per-image primitive: a miss is only logged here. Batch-level user
    /// feedback belongs to [`scan_batch`](Self::scan_batch).
    pub async fn scan_image(
        &self,
        image: &[u8],
    ) -> std::result::Result<Option<String>, DecodeError> {
        match self.decoder.decode_image(image).await? {
            Some(code) if code.trim().is_empty() => {
                warn!(decoder = self.decoder.name(), "Decoder produced a blank string, treating as a miss");
                Ok(None)
            }
            Some(code) => {
                if !barcode::is_well_formed(&code) {
                    // Accepted anyway; the formats we validate are not exhaustive
                    warn!(barcode = %code, "Decoded barcode failed format validation");
                }
                info!(barcode = %code, decoder = self.decoder.name(), "Barcode detected");
                self.session.set(Some(code.clone())).await;
                self.bus.emit(AppEvent::BarcodeDetected {
                    barcode: code.clone(),
                    timestamp: chrono::Utc::now(),
                });
                Ok(Some(code))
            }
            None => {
                debug!(
                    decoder = self.decoder.name(),
                    bytes = image.len(),
                    "No barcode in image"
                );
                Ok(None)
            }
        }
    }

    /// Decode a batch of uploaded images, stopping at the first hit
    ///
    /// Returns the detected barcode, or `None` when the whole batch came up
    /// empty. An empty batch produces exactly one user notification; decoder
    /// faults on individual images are logged and counted as misses so one
    /// bad upload cannot sink the rest of the batch.
    pub async fn scan_batch(&self, images: &[Vec<u8>]) -> Option<String> {
        for (index, image) in images.iter().enumerate() {
            match self.scan_image(image).await {
                Ok(Some(code)) => {
                    debug!(
                        index,
                        remaining = images.len() - index - 1,
                        "Batch scan stopped at first hit"
                    );
                    return Some(code);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(index, error = %e, "Image could not be decoded, continuing batch");
                }
            }
        }

        if !images.is_empty() {
            info!(images = images.len(), "Batch scan found no barcodes");
            self.bus.notify(
                "No barcodes found",
                "None of the uploaded images contained a readable barcode",
                Severity::Error,
            );
        }
        None
    }
}
