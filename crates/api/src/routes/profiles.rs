//! Profile endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::profile::{ApiTokenResponse, ProfileResponse};
use domain::services::ProfileService;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProfileAuth;

/// Returns the caller's profile.
///
/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: ProfileAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = ProfileService::new(state.store.as_ref())
        .current(auth.profile_id)
        .await?;
    Ok(Json(profile.into()))
}

/// Issues a fresh API token for the caller's own profile.
///
/// POST /api/v1/profiles/:profile_id/tokens
pub async fn rotate_api_token(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(profile_id): Path<String>,
) -> Result<Json<ApiTokenResponse>, ApiError> {
    let response = ProfileService::new(state.store.as_ref())
        .rotate_api_token(auth.profile_id, &profile_id)
        .await?;
    Ok(Json(response))
}
