//! Scan session state
//!
//! A one-slot pending-transaction buffer bridging the decode step and the
//! save step: Idle (empty) → Pending (decoded barcode awaiting profile
//! selection) → Idle (cleared by commit or cancel). Setting while already
//! Pending overwrites; a new scan supersedes an unconsumed one.

use tokio::sync::RwLock;

/// Holds the single "currently detected barcode awaiting assignment" value
pub struct ScanSession {
    current: RwLock<Option<String>>,
}

impl ScanSession {
    /// New session in the Idle state
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Replace the pending value unconditionally (last decode wins)
    pub async fn set(&self, barcode: Option<String>) {
        let mut current = self.current.write().await;
        *current = barcode;
    }

    /// Current pending barcode, if any
    pub async fn get(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Return to Idle, discarding any pending value
    pub async fn clear(&self) {
        self.set(None).await;
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}
