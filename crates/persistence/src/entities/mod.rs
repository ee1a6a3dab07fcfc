//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod device;
pub mod home;
pub mod profile;

pub use device::DeviceEntity;
pub use home::HomeEntity;
pub use profile::ProfileEntity;
