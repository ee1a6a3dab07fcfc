//! Repository implementations for database operations.

pub mod device;
pub mod home;
pub mod profile;

pub use device::DeviceRepository;
pub use home::HomeRepository;
pub use profile::ProfileRepository;
