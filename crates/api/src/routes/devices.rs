//! Device endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use domain::models::{AssignDeviceRequest, Device, MessageResponse};
use domain::services::devices::DEVICE_DELETED;
use domain::services::placement::DEVICE_ASSIGNED;
use domain::services::{DeviceService, PlacementService};
use domain::ServiceError;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProfileAuth;
use crate::middleware::metrics::record_placement;

/// Lists the devices in the caller's device set.
///
/// GET /api/v1/devices
pub async fn list_devices(
    State(state): State<AppState>,
    auth: ProfileAuth,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = DeviceService::new(state.store.as_ref())
        .list(auth.profile_id)
        .await?;
    Ok(Json(devices))
}

/// Places a device into a room of one of the caller's homes.
///
/// The device is first removed from every room of the caller's homes, so
/// after success it sits in exactly the requested room.
///
/// PUT /api/v1/devices/:device_id
pub async fn assign_device(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(device_id): Path<String>,
    payload: Result<Json<AssignDeviceRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;

    let result = PlacementService::new(state.store.as_ref())
        .assign(auth.profile_id, &device_id, &request)
        .await;
    record_placement(placement_outcome(&result));
    result?;

    Ok(Json(MessageResponse::new(DEVICE_ASSIGNED)))
}

/// Deletes a device from the caller's profile and from the store.
///
/// DELETE /api/v1/devices/:device_id
pub async fn delete_device(
    State(state): State<AppState>,
    auth: ProfileAuth,
    Path(device_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    DeviceService::new(state.store.as_ref())
        .delete(auth.profile_id, &device_id)
        .await?;
    Ok(Json(MessageResponse::new(DEVICE_DELETED)))
}

fn placement_outcome(result: &Result<(), ServiceError>) -> &'static str {
    match result {
        Ok(()) => "assigned",
        Err(ServiceError::Malformed(_)) => "malformed",
        Err(ServiceError::Unauthenticated(_) | ServiceError::NotAuthorized(_)) => "denied",
        Err(ServiceError::NotFound(_)) => "not_found",
        Err(_) => "error",
    }
}
