//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Device, Feature};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: Uuid,
    pub mac: String,
    pub manufacturer: String,
    pub model: String,
    pub features: Json<Vec<Feature>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceEntity> for Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            mac: entity.mac,
            manufacturer: entity.manufacturer,
            model: entity.model,
            features: entity.features.0,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
