//! Home entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Home, Room};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the homes table. Rooms stay embedded as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct HomeEntity {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub rooms: Json<Vec<Room>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HomeEntity> for Home {
    fn from(entity: HomeEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            location: entity.location,
            rooms: entity.rooms.0,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
