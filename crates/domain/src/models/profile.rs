//! Profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity reported by the external login provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentity {
    pub provider_id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

/// The owning account. Root of the ownership graph.
///
/// Homes and devices carry no owner field; ownership is the presence of their
/// id in `home_ids` / `device_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub identity: ExternalIdentity,
    #[serde(skip_serializing)] // Never serialize token hash to API responses
    pub api_token_hash: String,
    pub home_ids: Vec<Uuid>,
    pub device_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Builds a fresh profile with empty home and device sets.
    pub fn new(identity: ExternalIdentity, api_token_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: shared::ids::new_resource_id(),
            identity,
            api_token_hash,
            home_ids: Vec::new(),
            device_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_home(&self, home_id: Uuid) -> bool {
        self.home_ids.contains(&home_id)
    }

    pub fn has_device(&self, device_id: Uuid) -> bool {
        self.device_ids.contains(&device_id)
    }
}

/// Response payload for the current profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub homes: Vec<Uuid>,
    pub devices: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            login: profile.identity.login,
            name: profile.identity.name,
            email: profile.identity.email,
            avatar_url: profile.identity.avatar_url,
            homes: profile.home_ids,
            devices: profile.device_ids,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Response payload carrying a freshly issued API token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenResponse {
    pub api_token: String,
}
