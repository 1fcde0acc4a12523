//! Item collection endpoints

use crate::error::{ApiError, ApiResult};
use crate::events::Severity;
use crate::model::{BarcodeItem, ItemDraft};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

/// GET /api/items
///
/// All saved items across profiles, oldest first.
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<BarcodeItem>> {
    Json(state.items.list().await)
}

/// POST /api/items
///
/// Commit a draft item to a profile. The referenced profile must exist
/// (404 otherwise); a blank barcode is rejected with 400. A successful
/// commit consumes the pending scan, returning the session to idle.
pub async fn save_item(
    State(state): State<AppState>,
    Json(draft): Json<ItemDraft>,
) -> ApiResult<(StatusCode, Json<BarcodeItem>)> {
    info!(
        "Save item request: barcode {:?} -> profile {}",
        draft.barcode, draft.profile_id
    );

    let profile = state
        .profiles
        .get_by_id(draft.profile_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("profile {}", draft.profile_id)))?;

    let item = state.items.add(draft).await?;

    // The scan that produced this draft is consumed even if it was already
    // replaced by a newer one; a commit always returns the session to idle
    state.session.clear().await;

    state.bus.notify(
        "Product Saved",
        &format!(
            "\"{}\" has been saved to {}'s wish list",
            item.product_name, profile.name
        ),
        Severity::Info,
    );
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items/:item_id
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<BarcodeItem>> {
    state
        .items
        .get_by_id(item_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("item {}", item_id)))
}

/// DELETE /api/items/:item_id
///
/// Remove one item. Removing an unknown item is a no-op 204.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    info!("Delete item request: {}", item_id);

    let existing = state.items.get_by_id(item_id).await;
    state.items.remove(item_id).await?;

    if existing.is_some() {
        state.bus.notify(
            "Item Removed",
            "The item has been removed from the wishlist",
            Severity::Info,
        );
    }
    Ok(StatusCode::NO_CONTENT)
}
