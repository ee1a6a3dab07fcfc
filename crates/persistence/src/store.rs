//! PostgreSQL implementation of the domain store ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::{Device, Home, Profile, Room};
use domain::store::{DeviceStore, HomeStore, ProfileStore, Store};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::metrics::record_pool_metrics;
use crate::repositories::{DeviceRepository, HomeRepository, ProfileRepository};

/// SQLSTATE for unique violations.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Maps driver errors onto the store error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
        sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("connection error: {}", e)),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::Duplicate(
                db_err
                    .constraint()
                    .unwrap_or("unique constraint")
                    .to_string(),
            ),
            Some(QUERY_CANCELED) => StoreError::Unavailable("statement timed out".into()),
            _ => StoreError::Backend(format!("database error: {}", db_err)),
        },
        other => StoreError::Backend(format!("database error: {}", other)),
    }
}

/// Document store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    profiles: ProfileRepository,
    homes: HomeRepository,
    devices: DeviceRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            homes: HomeRepository::new(pool.clone()),
            devices: DeviceRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let entity = self.profiles.find_by_id(id).await.map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_profile_by_api_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let entity = self
            .profiles
            .find_by_api_token_hash(token_hash)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_profile_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let entity = self
            .profiles
            .find_by_provider_id(provider_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.profiles.insert(profile).await.map_err(map_sqlx_error)
    }

    async fn set_api_token_hash(&self, id: Uuid, token_hash: &str) -> Result<bool, StoreError> {
        let rows = self
            .profiles
            .set_api_token_hash(id, token_hash, Utc::now())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn add_home_to_profile(&self, profile_id: Uuid, home_id: Uuid) -> Result<(), StoreError> {
        self.profiles
            .add_home(profile_id, home_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn remove_home_from_profile(
        &self,
        profile_id: Uuid,
        home_id: Uuid,
    ) -> Result<(), StoreError> {
        self.profiles
            .remove_home(profile_id, home_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn add_device_to_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        self.profiles
            .add_device(profile_id, device_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn remove_device_from_profile(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        self.profiles
            .remove_device(profile_id, device_id)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl HomeStore for PgStore {
    async fn find_home(&self, id: Uuid) -> Result<Option<Home>, StoreError> {
        let entity = self.homes.find_by_id(id).await.map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_homes(&self, ids: &[Uuid]) -> Result<Vec<Home>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let entities = self.homes.find_by_ids(ids).await.map_err(map_sqlx_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn insert_home(&self, home: &Home) -> Result<(), StoreError> {
        self.homes.insert(home).await.map_err(map_sqlx_error)
    }

    async fn update_home_fields(
        &self,
        id: Uuid,
        name: &str,
        location: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rows = self
            .homes
            .update_fields(id, name, location, at)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn delete_home(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows = self.homes.delete(id).await.map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn push_room(&self, home_id: Uuid, room: &Room) -> Result<bool, StoreError> {
        let rows = self
            .homes
            .push_room(home_id, room)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn update_room_fields(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        name: &str,
        floor: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rows = self
            .homes
            .update_room_fields(home_id, room_id, name, floor, at)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn remove_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rows = self
            .homes
            .remove_room(home_id, room_id, at)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }

    async fn pull_device_from_rooms(
        &self,
        home_ids: &[Uuid],
        device_id: Uuid,
    ) -> Result<(), StoreError> {
        if home_ids.is_empty() {
            return Ok(());
        }
        self.homes
            .pull_device_from_rooms(home_ids, device_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn add_device_to_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        device_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rows = self
            .homes
            .add_device_to_room(home_id, room_id, device_id, at)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }
}

#[async_trait]
impl DeviceStore for PgStore {
    async fn find_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        let entity = self.devices.find_by_id(id).await.map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_device_by_mac(&self, mac: &str) -> Result<Option<Device>, StoreError> {
        let entity = self.devices.find_by_mac(mac).await.map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let entities = self.devices.find_by_ids(ids).await.map_err(map_sqlx_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn insert_device(&self, device: &Device) -> Result<(), StoreError> {
        self.devices.insert(device).await.map_err(map_sqlx_error)
    }

    async fn delete_device(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows = self.devices.delete(id).await.map_err(map_sqlx_error)?;
        Ok(rows > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Database ping failed");
                map_sqlx_error(e)
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
