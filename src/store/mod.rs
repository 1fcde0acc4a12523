//! In-memory stores over durable storage
//!
//! Explicit store objects with constructor-injected backends; no ambient
//! singletons. Callers render from the in-memory collections, so every
//! mutating operation persists first and applies to memory only after the
//! durable write acknowledges: a successful return guarantees a subsequent
//! `list()` reflects the change, and a failure leaves memory untouched.

mod items;
mod profiles;

pub use items::ItemStore;
pub use profiles::{ProfileStore, STARTER_PROFILES};
