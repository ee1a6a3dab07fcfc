//! Device lifecycle: self-registration, listing and deletion.

use chrono::Utc;
use shared::crypto::hash_api_token;
use shared::ids::parse_resource_id;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, StoreError};
use crate::models::device::normalize_mac;
use crate::models::{Device, RegisterDeviceRequest};
use crate::services::guard::{AuthorizationGuard, Resource};
use crate::services::orphan::record_orphan_write;
use crate::services::placement::PlacementService;
use crate::store::{DeviceStore, HomeStore, ProfileStore};

pub const DEVICE_DELETED: &str = "device has been deleted";
pub const ALREADY_REGISTERED: &str = "Already registered";

pub struct DeviceService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> DeviceService<'a, S>
where
    S: ProfileStore + HomeStore + DeviceStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Devices in the caller's device set.
    pub async fn list(&self, profile_id: Uuid) -> Result<Vec<Device>, ServiceError> {
        let profile = AuthorizationGuard::new(self.store)
            .resolve_profile(profile_id)
            .await?;
        Ok(self.store.find_devices(&profile.device_ids).await?)
    }

    /// Registers a device on behalf of the profile owning `api_token`.
    ///
    /// At most one device exists per MAC address; a second registration is a
    /// conflict, including when two registrations race on the unique index.
    pub async fn register(&self, request: RegisterDeviceRequest) -> Result<Device, ServiceError> {
        let token_hash = hash_api_token(&request.api_token);
        let owner = self
            .store
            .find_profile_by_api_token_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                warn!("Registration with an unknown API token");
                ServiceError::Malformed(
                    "cannot register, profile token missing or not valid".into(),
                )
            })?;

        let mac = normalize_mac(&request.mac);
        if self.store.find_device_by_mac(&mac).await?.is_some() {
            info!(mac = %mac, "Device already registered");
            return Err(ServiceError::Conflict(ALREADY_REGISTERED.into()));
        }

        let device = request.into_device(Utc::now());
        match self.store.insert_device(&device).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                info!(mac = %mac, "Device registered concurrently");
                return Err(ServiceError::Conflict(ALREADY_REGISTERED.into()));
            }
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = self.store.add_device_to_profile(owner.id, device.id).await {
            record_orphan_write("register_device", device.id, &err);
        }

        info!(
            profile_id = %owner.id,
            device_id = %device.id,
            features = device.features.len(),
            controller = device.is_controller(),
            "Device registered"
        );
        Ok(device)
    }

    /// Deletes an owned device.
    ///
    /// The device is first removed from the caller's rooms, then from the
    /// caller's device set, and finally the document is deleted.
    pub async fn delete(&self, profile_id: Uuid, device_id: &str) -> Result<(), ServiceError> {
        let device_id = parse_resource_id(device_id, "deviceId")?;

        let guard = AuthorizationGuard::new(self.store);
        let profile = guard.resolve_profile(profile_id).await?;
        let denied = |_: Resource| {
            ServiceError::NotOwned("cannot delete device, because it is not in your profile".into())
        };

        guard
            .guarded(profile.id, Resource::Device(device_id), denied, || async move {
                PlacementService::new(self.store)
                    .unplace(&profile.home_ids, device_id)
                    .await?;
                self.store
                    .remove_device_from_profile(profile.id, device_id)
                    .await?;
                if let Err(err) = self.store.delete_device(device_id).await {
                    record_orphan_write("delete_device", device_id, &err);
                }
                info!(profile_id = %profile.id, device_id = %device_id, "Device deleted");
                Ok(())
            })
            .await
    }
}
