//! Placement reassignment protocol.
//!
//! Moves a device into a room of one of the caller's homes. All checks run
//! before the first write. The move itself is two single-document steps:
//!
//! - `unplace` removes the device from every room of every home the caller
//!   owns. Homes of other profiles are never touched, even if they list the
//!   device.
//! - the insert adds the device to the target room's set.
//!
//! There is no transaction across the steps. A failure or cancellation
//! between them leaves the device unplaced; re-sending the request repairs
//! it because both steps are idempotent. Two concurrent placements of the
//! same device may interleave; the last insert wins.

use chrono::Utc;
use shared::ids::parse_resource_id;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::AssignDeviceRequest;
use crate::services::guard::{not_authorized, AuthorizationGuard, Resource};
use crate::store::{HomeStore, ProfileStore};

pub const DEVICE_ASSIGNED: &str = "device has been assigned to room";

/// A fully validated placement target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub device_id: Uuid,
    pub home_id: Uuid,
    pub room_id: Uuid,
}

impl Placement {
    /// Parses the raw ids in protocol order: device, home, room.
    pub fn parse(device_id: &str, request: &AssignDeviceRequest) -> Result<Self, ServiceError> {
        Ok(Self {
            device_id: parse_resource_id(device_id, "deviceId")?,
            home_id: parse_resource_id(&request.home_id, "homeId")?,
            room_id: parse_resource_id(&request.room_id, "roomId")?,
        })
    }
}

pub struct PlacementService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PlacementService<'a, S>
where
    S: ProfileStore + HomeStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Places a device into a room, removing it from any other room of the
    /// caller's homes.
    pub async fn assign(
        &self,
        profile_id: Uuid,
        device_id: &str,
        request: &AssignDeviceRequest,
    ) -> Result<(), ServiceError> {
        let target = Placement::parse(device_id, request)?;

        let guard = AuthorizationGuard::new(self.store);
        let profile = guard.resolve_profile(profile_id).await?;
        guard
            .require(profile.id, Resource::Device(target.device_id), not_authorized)
            .await?;
        guard
            .require(profile.id, Resource::Home(target.home_id), not_authorized)
            .await?;

        let home = self
            .store
            .find_home(target.home_id)
            .await?
            .ok_or_else(|| {
                warn!(home_id = %target.home_id, "Owned home document is missing");
                ServiceError::NotFound(format!("Cannot find home id = {}", target.home_id))
            })?;
        if !home.has_room(target.room_id) {
            return Err(room_not_found(target.room_id));
        }

        // Unplace must complete before the insert starts.
        self.unplace(&profile.home_ids, target.device_id).await?;

        let placed = self
            .store
            .add_device_to_room(target.home_id, target.room_id, target.device_id, Utc::now())
            .await?;
        if !placed {
            // The room went away between the check and the write.
            warn!(
                device_id = %target.device_id,
                home_id = %target.home_id,
                room_id = %target.room_id,
                "Target room disappeared before assignment; device left unplaced"
            );
            return Err(room_not_found(target.room_id));
        }

        info!(
            profile_id = %profile.id,
            device_id = %target.device_id,
            home_id = %target.home_id,
            room_id = %target.room_id,
            "Device assigned to room"
        );
        Ok(())
    }

    /// Removes the device from every room of the given homes.
    ///
    /// Idempotent; a device that is not placed anywhere is a no-op.
    pub async fn unplace(&self, home_ids: &[Uuid], device_id: Uuid) -> Result<(), ServiceError> {
        if home_ids.is_empty() {
            return Ok(());
        }
        self.store.pull_device_from_rooms(home_ids, device_id).await?;
        Ok(())
    }
}

fn room_not_found(room_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Cannot find room id = {}", room_id))
}
