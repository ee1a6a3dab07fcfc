//! In-memory document store.
//!
//! Same semantics as [`crate::PgStore`], kept in process. Used by the test
//! suites and for `database.backend = "memory"` local runs. Individual
//! operations can be made to fail by name to exercise partial-failure paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::{Device, Home, Profile, Room};
use domain::store::{DeviceStore, HomeStore, ProfileStore, Store};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Documents {
    profiles: HashMap<Uuid, Profile>,
    homes: HashMap<Uuid, Home>,
    devices: HashMap<Uuid, Device>,
}

/// In-memory store. Clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<Documents>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call to the named store operation fail with
    /// [`StoreError::Unavailable`] until [`MemoryStore::recover`] is called.
    pub async fn fail_on(&self, operation: &str) {
        self.failing.write().await.insert(operation.to_string());
    }

    pub async fn recover(&self, operation: &str) {
        self.failing.write().await.remove(operation);
    }

    async fn check(&self, operation: &str) -> Result<(), StoreError> {
        if self.failing.read().await.contains(operation) {
            return Err(StoreError::Unavailable(format!(
                "injected failure in {}",
                operation
            )));
        }
        Ok(())
    }

    /// Number of stored documents per collection: (profiles, homes, devices).
    pub async fn counts(&self) -> (usize, usize, usize) {
        let docs = self.docs.read().await;
        (docs.profiles.len(), docs.homes.len(), docs.devices.len())
    }
}

fn sorted<T>(mut items: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

fn add_to_set(set: &mut Vec<Uuid>, id: Uuid) -> bool {
    if set.contains(&id) {
        return false;
    }
    set.push(id);
    true
}

fn remove_from_set(set: &mut Vec<Uuid>, id: Uuid) -> bool {
    let before = set.len();
    set.retain(|member| *member != id);
    set.len() != before
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.check("find_profile").await?;
        Ok(self.docs.read().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_api_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StoreError> {
        self.check("find_profile_by_api_token_hash").await?;
        let docs = self.docs.read().await;
        Ok(docs
            .profiles
            .values()
            .find(|p| p.api_token_hash == token_hash)
            .cloned())
    }

    async fn find_profile_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Profile>, StoreError> {
        self.check("find_profile_by_provider_id").await?;
        let docs = self.docs.read().await;
        Ok(docs
            .profiles
            .values()
            .find(|p| p.identity.provider_id == provider_id)
            .cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.check("insert_profile").await?;
        let mut docs = self.docs.write().await;
        let taken = docs.profiles.values().any(|p| {
            p.id == profile.id
                || p.identity.provider_id == profile.identity.provider_id
                || p.api_token_hash == profile.api_token_hash
        });
        if taken {
            return Err(StoreError::Duplicate("profiles_provider_id_unique".into()));
        }
        docs.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn set_api_token_hash(&self, id: Uuid, token_hash: &str) -> Result<bool, StoreError> {
        self.check("set_api_token_hash").await?;
        let mut docs = self.docs.write().await;
        match docs.profiles.get_mut(&id) {
            Some(profile) => {
                profile.api_token_hash = token_hash.to_string();
                profile.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_home_to_profile(&self, profile_id: Uuid, home_id: Uuid) -> Result<(), StoreError> {
        self.check("add_home_to_profile").await?;
        let mut docs = self.docs.write().await;
        if let Some(profile) = docs.profiles.get_mut(&profile_id) {
            if add_to_set(&mut profile.home_ids, home_id) {
                profile.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn remove_home_from_profile(
        &self,
        profile_id: Uuid,
        home_id: Uuid,
    ) -> Result<(), StoreError> {
        self.check("remove_home_from_profile").await?;
        let mut docs = self.docs.write().await;
        if let Some(profile) = docs.profiles.get_mut(&profile_id) {
            if remove_from_set(&mut profile.home_ids, home_id) {
                profile.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn add_device_to_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        self.check("add_device_to_profile").await?;
        let mut docs = self.docs.write().await;
        if let Some(profile) = docs.profiles.get_mut(&profile_id) {
            if add_to_set(&mut profile.device_ids, device_id) {
                profile.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn remove_device_from_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        self.check("remove_device_from_profile").await?;
        let mut docs = self.docs.write().await;
        if let Some(profile) = docs.profiles.get_mut(&profile_id) {
            if remove_from_set(&mut profile.device_ids, device_id) {
                profile.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl HomeStore for MemoryStore {
    async fn find_home(&self, id: Uuid) -> Result<Option<Home>, StoreError> {
        self.check("find_home").await?;
        Ok(self.docs.read().await.homes.get(&id).cloned())
    }

    async fn find_homes(&self, ids: &[Uuid]) -> Result<Vec<Home>, StoreError> {
        self.check("find_homes").await?;
        let docs = self.docs.read().await;
        let homes = ids.iter().filter_map(|id| docs.homes.get(id).cloned()).collect();
        Ok(sorted(homes, |h| (h.created_at, h.id)))
    }

    async fn insert_home(&self, home: &Home) -> Result<(), StoreError> {
        self.check("insert_home").await?;
        let mut docs = self.docs.write().await;
        if docs.homes.contains_key(&home.id) {
            return Err(StoreError::Duplicate("homes_pkey".into()));
        }
        docs.homes.insert(home.id, home.clone());
        Ok(())
    }

    async fn update_home_fields(
        &self,
        id: Uuid,
        name: &str,
        location: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check("update_home_fields").await?;
        let mut docs = self.docs.write().await;
        match docs.homes.get_mut(&id) {
            Some(home) => {
                home.name = name.to_string();
                home.location = location.to_string();
                home.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_home(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check("delete_home").await?;
        Ok(self.docs.write().await.homes.remove(&id).is_some())
    }

    async fn push_room(&self, home_id: Uuid, room: &Room) -> Result<bool, StoreError> {
        self.check("push_room").await?;
        let mut docs = self.docs.write().await;
        match docs.homes.get_mut(&home_id) {
            Some(home) => {
                home.rooms.push(room.clone());
                home.updated_at = room.created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_room_fields(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        name: &str,
        floor: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check("update_room_fields").await?;
        let mut docs = self.docs.write().await;
        let Some(home) = docs.homes.get_mut(&home_id) else {
            return Ok(false);
        };
        let Some(room) = home.rooms.iter_mut().find(|r| r.id == room_id) else {
            return Ok(false);
        };
        room.name = name.to_string();
        room.floor = floor;
        room.updated_at = at;
        home.updated_at = at;
        Ok(true)
    }

    async fn remove_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check("remove_room").await?;
        let mut docs = self.docs.write().await;
        let Some(home) = docs.homes.get_mut(&home_id) else {
            return Ok(false);
        };
        let before = home.rooms.len();
        home.rooms.retain(|r| r.id != room_id);
        if home.rooms.len() == before {
            return Ok(false);
        }
        home.updated_at = at;
        Ok(true)
    }

    async fn pull_device_from_rooms(
        &self,
        home_ids: &[Uuid],
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        self.check("pull_device_from_rooms").await?;
        let mut docs = self.docs.write().await;
        for home_id in home_ids {
            if let Some(home) = docs.homes.get_mut(home_id) {
                for room in home.rooms.iter_mut() {
                    remove_from_set(&mut room.devices, device_id);
                }
            }
        }
        Ok(())
    }

    async fn add_device_to_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        device_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check("add_device_to_room").await?;
        let mut docs = self.docs.write().await;
        let Some(home) = docs.homes.get_mut(&home_id) else {
            return Ok(false);
        };
        let Some(room) = home.rooms.iter_mut().find(|r| r.id == room_id) else {
            return Ok(false);
        };
        add_to_set(&mut room.devices, device_id);
        room.updated_at = at;
        home.updated_at = at;
        Ok(true)
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn find_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        self.check("find_device").await?;
        Ok(self.docs.read().await.devices.get(&id).cloned())
    }

    async fn find_device_by_mac(&self, mac: &str) -> Result<Option<Device>, StoreError> {
        self.check("find_device_by_mac").await?;
        let docs = self.docs.read().await;
        Ok(docs.devices.values().find(|d| d.mac == mac).cloned())
    }

    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        self.check("find_devices").await?;
        let docs = self.docs.read().await;
        let devices = ids.iter().filter_map(|id| docs.devices.get(id).cloned()).collect();
        Ok(sorted(devices, |d| (d.created_at, d.id)))
    }

    async fn insert_device(&self, device: &Device) -> Result<(), StoreError> {
        self.check("insert_device").await?;
        let mut docs = self.docs.write().await;
        if docs.devices.values().any(|d| d.mac == device.mac) {
            return Err(StoreError::Duplicate("devices_mac_unique".into()));
        }
        docs.devices.insert(device.id, device.clone());
        Ok(())
    }

    async fn delete_device(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check("delete_device").await?;
        Ok(self.docs.write().await.devices.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check("ping").await
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
