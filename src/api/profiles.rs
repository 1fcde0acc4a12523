//! Profile collection endpoints

use crate::error::{ApiError, ApiResult};
use crate::events::Severity;
use crate::model::{BarcodeItem, Profile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Request body for profile creation and rename
#[derive(Debug, Deserialize)]
pub struct ProfileNameRequest {
    pub name: String,
}

/// GET /api/profiles
///
/// List all profiles in creation order.
pub async fn list_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.profiles.list().await)
}

/// POST /api/profiles
///
/// Create a profile. A blank or whitespace-only name is rejected with 400
/// and leaves the collection unchanged.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileNameRequest>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    info!("Create profile request: {:?}", req.name);

    let profile = state.profiles.add(&req.name).await?;
    state.bus.notify(
        "Profile Added",
        &format!("{} has been added as a new profile.", profile.name),
        Severity::Info,
    );
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/profiles/:profile_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> ApiResult<Json<Profile>> {
    state
        .profiles
        .get_by_id(profile_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("profile {}", profile_id)))
}

/// PUT /api/profiles/:profile_id
///
/// Rename a profile. Always answers 204: a rename that cannot be applied
/// (unknown id, blank name, storage failure) is dropped after local logging,
/// so the caller sees no difference.
pub async fn rename_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<ProfileNameRequest>,
) -> StatusCode {
    info!("Rename profile request: {} -> {:?}", profile_id, req.name);

    state.profiles.rename(profile_id, &req.name).await;
    StatusCode::NO_CONTENT
}

/// DELETE /api/profiles/:profile_id
///
/// Remove a profile and every item it owns. Removing an unknown profile is a
/// no-op 204.
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    info!("Delete profile request: {}", profile_id);

    let existing = state.profiles.get_by_id(profile_id).await;
    state.profiles.remove(profile_id).await?;

    if let Some(profile) = existing {
        state.bus.notify(
            "Profile Deleted",
            &format!("{}'s profile has been deleted", profile.name),
            Severity::Info,
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/profiles/:profile_id/items
///
/// Items owned by one profile, oldest first. An unknown or just-removed
/// profile yields an empty list, not an error.
pub async fn list_profile_items(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Json<Vec<BarcodeItem>> {
    Json(state.items.list_by_profile(profile_id).await)
}
