//! Document store ports.
//!
//! Profiles, homes and devices are independent documents with no foreign keys
//! between them. Every method here touches at most one document, and that
//! per-document atomicity is the only consistency primitive the services rely
//! on. Set-style operations are idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Device, Home, Profile, Room};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn find_profile_by_api_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StoreError>;

    async fn find_profile_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Profile>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] if the provider id is taken.
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Returns false when no profile has this id.
    async fn set_api_token_hash(&self, id: Uuid, token_hash: &str) -> Result<bool, StoreError>;

    async fn add_home_to_profile(&self, profile_id: Uuid, home_id: Uuid) -> Result<(), StoreError>;

    async fn remove_home_from_profile(
        &self,
        profile_id: Uuid,
        home_id: Uuid,
    ) -> Result<(), StoreError>;

    async fn add_device_to_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError>;

    async fn remove_device_from_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait HomeStore: Send + Sync {
    async fn find_home(&self, id: Uuid) -> Result<Option<Home>, StoreError>;

    /// Homes among `ids`; unknown ids are skipped.
    async fn find_homes(&self, ids: &[Uuid]) -> Result<Vec<Home>, StoreError>;

    async fn insert_home(&self, home: &Home) -> Result<(), StoreError>;

    /// Returns false when the home does not exist.
    async fn update_home_fields(
        &self,
        id: Uuid,
        name: &str,
        location: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Returns false when the home did not exist.
    async fn delete_home(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns false when the home does not exist.
    async fn push_room(&self, home_id: Uuid, room: &Room) -> Result<bool, StoreError>;

    /// Returns false when the home or the room does not exist.
    async fn update_room_fields(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        name: &str,
        floor: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Returns false when the home or the room does not exist.
    async fn remove_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Removes `device_id` from every room of the listed homes.
    ///
    /// One write per home document; homes outside `home_ids` are never read
    /// or written.
    async fn pull_device_from_rooms(
        &self,
        home_ids: &[Uuid],
        device_id: Uuid,
    ) -> Result<(), StoreError>;

    /// Adds `device_id` to the room's device set if absent and refreshes the
    /// room and home timestamps. Returns false when the home or room is gone.
    async fn add_device_to_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        device_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn find_device(&self, id: Uuid) -> Result<Option<Device>, StoreError>;

    async fn find_device_by_mac(&self, mac: &str) -> Result<Option<Device>, StoreError>;

    /// Devices among `ids`; unknown ids are skipped.
    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] on a MAC collision.
    async fn insert_device(&self, device: &Device) -> Result<(), StoreError>;

    /// Returns false when the device did not exist.
    async fn delete_device(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Complete document store used by the application.
#[async_trait]
pub trait Store: ProfileStore + HomeStore + DeviceStore {
    /// Round-trip to the backing store, used by readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for health output and logs.
    fn backend(&self) -> &'static str;
}
