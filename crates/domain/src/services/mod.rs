//! Domain services for homegraph.
//!
//! Services borrow a store for the duration of one request and contain the
//! ownership and placement rules. Each write they issue touches one document.

pub mod devices;
pub mod guard;
pub mod homes;
pub mod orphan;
pub mod ownership;
pub mod placement;
pub mod profiles;

pub use devices::DeviceService;
pub use guard::{AuthorizationGuard, Decision, Resource};
pub use homes::HomeService;
pub use ownership::{Membership, OwnershipIndex};
pub use placement::{Placement, PlacementService};
pub use profiles::{ProfileService, SignIn};
