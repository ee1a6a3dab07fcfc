//! Device domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_api_token;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Whether a feature can be driven or only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Controller,
    Sensor,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Controller => "controller",
            FeatureKind::Sensor => "sensor",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named capability of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub name: String,
    pub enable: bool,
    pub order: i32,
    pub unit: String,
}

/// A registered physical device. It has no owner or room field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub mac: String,
    pub manufacturer: String,
    pub model: String,
    pub features: Vec<Feature>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn is_controller(&self) -> bool {
        self.features
            .iter()
            .any(|feature| feature.kind == FeatureKind::Controller)
    }
}

/// Feature declared by a device during registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    #[serde(rename = "type")]
    pub kind: FeatureKind,

    #[validate(length(min = 2, max = 20, message = "Name must be between 2 and 20 characters"))]
    pub name: String,

    #[serde(default)]
    pub enable: bool,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: i32,

    #[validate(length(min = 1, max = 10, message = "Unit must be between 1 and 10 characters"))]
    pub unit: String,
}

/// Request payload sent by a device registering itself.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_controller_features"))]
pub struct RegisterDeviceRequest {
    #[validate(regex(
        path = *MAC_ADDRESS_REGEX,
        message = "Invalid MAC address format"
    ))]
    pub mac: String,

    #[validate(length(
        min = 3,
        max = 50,
        message = "Manufacturer must be between 3 and 50 characters"
    ))]
    pub manufacturer: String,

    #[validate(length(min = 3, max = 20, message = "Model must be between 3 and 20 characters"))]
    pub model: String,

    #[validate(custom(function = "validate_api_token"))]
    pub api_token: String,

    #[validate(length(min = 1, message = "At least one feature is required"))]
    #[validate(nested)]
    pub features: Vec<FeatureRequest>,
}

lazy_static::lazy_static! {
    static ref MAC_ADDRESS_REGEX: regex::Regex =
        regex::Regex::new(r"^(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}$").unwrap();
}

/// A controller device must declare exactly one feature.
fn validate_controller_features(req: &RegisterDeviceRequest) -> Result<(), ValidationError> {
    let is_controller = req
        .features
        .iter()
        .any(|feature| feature.kind == FeatureKind::Controller);

    if is_controller && req.features.len() > 1 {
        let mut err = ValidationError::new("controller_features");
        err.message = Some("A controller device must declare exactly one feature".into());
        return Err(err);
    }
    Ok(())
}

impl RegisterDeviceRequest {
    /// Builds the device document. MACs are stored lowercase so that the
    /// uniqueness check does not depend on the casing a device reports.
    pub fn into_device(self, now: DateTime<Utc>) -> Device {
        Device {
            id: shared::ids::new_resource_id(),
            mac: normalize_mac(&self.mac),
            manufacturer: self.manufacturer,
            model: self.model,
            features: self
                .features
                .into_iter()
                .map(|feature| Feature {
                    id: Uuid::new_v4(),
                    kind: feature.kind,
                    name: feature.name,
                    enable: feature.enable,
                    order: feature.order,
                    unit: feature.unit,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form of a MAC address: lowercase, colon separated.
pub fn normalize_mac(mac: &str) -> String {
    mac.to_ascii_lowercase().replace('-', ":")
}

/// Request payload for placing a device into a room.
///
/// Ids are kept as strings so that a bad encoding is reported as malformed
/// input instead of a body rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeviceRequest {
    pub home_id: String,
    pub room_id: String,
}
