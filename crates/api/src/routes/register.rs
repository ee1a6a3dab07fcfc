//! Device self-registration.
//!
//! Devices authenticate with their owner's API token carried in the body,
//! not with a bearer token.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use domain::models::{Device, RegisterDeviceRequest};
use domain::services::DeviceService;
use domain::ServiceError;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_device_registration;

/// POST /api/v1/register
pub async fn register_device(
    State(state): State<AppState>,
    payload: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<Json<Device>, ApiError> {
    let Json(request) = payload?;
    if let Err(errors) = request.validate() {
        record_device_registration("invalid");
        return Err(errors.into());
    }

    let result = DeviceService::new(state.store.as_ref())
        .register(request)
        .await;
    record_device_registration(match &result {
        Ok(_) => "registered",
        Err(ServiceError::Conflict(_)) => "duplicate",
        Err(ServiceError::Malformed(_)) => "invalid",
        Err(_) => "error",
    });

    Ok(Json(result?))
}
