//! Profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ExternalIdentity, Profile};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub provider_id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub api_token_hash: String,
    pub home_ids: Vec<Uuid>,
    pub device_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            identity: ExternalIdentity {
                provider_id: entity.provider_id,
                login: entity.login,
                name: entity.name,
                email: entity.email,
                avatar_url: entity.avatar_url,
            },
            api_token_hash: entity.api_token_hash,
            home_ids: entity.home_ids,
            device_ids: entity.device_ids,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
