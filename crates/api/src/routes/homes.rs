//! Home and room endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use domain::models::home::{
    CreateHomeRequest, CreateRoomRequest, UpdateHomeRequest, UpdateRoomRequest,
};
use domain::models::{Home, MessageResponse, Room};
use domain::services::homes::{
    HomeService, HOME_DELETED, HOME_UPDATED, ROOM_ADDED, ROOM_DELETED, ROOM_UPDATED,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProfileAuth;

/// Lists the homes in the caller's home set.
///
/// GET /api/v1/homes
pub async fn list_homes(
    State(state): State<AppState>,
    auth: ProfileAuth,
) -> Result<Json<Vec<Home>>, ApiError> {
    let homes = HomeService::new(state.store.as_ref())
        .list(auth.profile_id)
        .await?;
    Ok(Json(homes))
}

/// Creates a home with its initial rooms.
///
/// POST /api/v1/homes
pub async fn create_home(
    State(state): State<AppState>,
    auth: ProfileAuth,
    payload: Result<Json<CreateHomeRequest>, JsonRejection>,
) -> Result<Json<Home>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let home = HomeService::new(state.store.as_ref())
        .create(auth.profile_id, request)
        .await?;
    Ok(Json(home))
}

/// PUT /api/v1/homes/:home_id
pub async fn update_home(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(home_id): Path<String>,
    payload: Result<Json<UpdateHomeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    HomeService::new(state.store.as_ref())
        .update(auth.profile_id, &home_id, &request)
        .await?;
    Ok(Json(MessageResponse::new(HOME_UPDATED)))
}

/// Deletes a home. Devices placed in its rooms are not touched.
///
/// DELETE /api/v1/homes/:home_id
pub async fn delete_home(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(home_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    HomeService::new(state.store.as_ref())
        .delete(auth.profile_id, &home_id)
        .await?;
    Ok(Json(MessageResponse::new(HOME_DELETED)))
}

/// GET /api/v1/homes/:home_id/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(home_id): Path<String>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = HomeService::new(state.store.as_ref())
        .list_rooms(auth.profile_id, &home_id)
        .await?;
    Ok(Json(rooms))
}

/// POST /api/v1/homes/:home_id/rooms
pub async fn add_room(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(home_id): Path<String>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    HomeService::new(state.store.as_ref())
        .add_room(auth.profile_id, &home_id, request)
        .await?;
    Ok(Json(MessageResponse::new(ROOM_ADDED)))
}

/// PUT /api/v1/homes/:home_id/rooms/:room_id
pub async fn update_room(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path((home_id, room_id)): Path<(String, String)>,
    payload: Result<Json<UpdateRoomRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    HomeService::new(state.store.as_ref())
        .update_room(auth.profile_id, &home_id, &room_id, &request)
        .await?;
    Ok(Json(MessageResponse::new(ROOM_UPDATED)))
}

/// Removes a room together with the placements it holds.
///
/// DELETE /api/v1/homes/:home_id/rooms/:room_id
pub async fn delete_room(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path((home_id, room_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    HomeService::new(state.store.as_ref())
        .delete_room(auth.profile_id, &home_id, &room_id)
        .await?;
    Ok(Json(MessageResponse::new(ROOM_DELETED)))
}
