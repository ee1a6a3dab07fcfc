//! Home and Room domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use uuid::Uuid;
use validator::Validate;

/// A room embedded in a home.
///
/// `devices` is the only record of where a device is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub floor: i32,
    #[serde(default)]
    pub devices: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(name: String, floor: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: shared::ids::new_resource_id(),
            name,
            floor,
            devices: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_device(&self, device_id: Uuid) -> bool {
        self.devices.contains(&device_id)
    }
}

/// A home document. It has no owner field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub rooms: Vec<Room>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Home {
    pub fn room(&self, room_id: Uuid) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    pub fn has_room(&self, room_id: Uuid) -> bool {
        self.room(room_id).is_some()
    }
}

/// Request payload for creating a home.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHomeRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Location must be between 1 and 50 characters"
    ))]
    pub location: String,

    #[serde(default)]
    #[validate(nested)]
    pub rooms: Vec<CreateRoomRequest>,
}

impl CreateHomeRequest {
    /// Builds the home document, giving every initial room a fresh id.
    pub fn into_home(self, now: DateTime<Utc>) -> Home {
        Home {
            id: shared::ids::new_resource_id(),
            name: self.name,
            location: self.location,
            rooms: self
                .rooms
                .into_iter()
                .map(|room| Room::new(room.name, room.floor, now))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request payload for renaming or relocating a home.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHomeRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Location must be between 1 and 50 characters"
    ))]
    pub location: String,
}

/// Request payload for adding a room.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(range(min = -50, max = 300, message = "Floor must be between -50 and 300"))]
    #[serde(default)]
    pub floor: i32,
}

/// Request payload for renaming a room or changing its floor.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(range(min = -50, max = 300, message = "Floor must be between -50 and 300"))]
    #[serde(default)]
    pub floor: i32,
}

/// Generic `{"message": ...}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
