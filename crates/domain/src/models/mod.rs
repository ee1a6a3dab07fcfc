//! Domain models for homegraph.

pub mod device;
pub mod home;
pub mod profile;

pub use device::{AssignDeviceRequest, Device, Feature, FeatureKind, RegisterDeviceRequest};
pub use home::{Home, MessageResponse, Room};
pub use profile::{ExternalIdentity, Profile};
