//! Authorization guard.
//!
//! Every mutation of the graph goes through here. The acting profile is
//! resolved from the store by the id carried in a verified credential, and
//! ownership is checked through the [`OwnershipIndex`] before anything is
//! written. Denials are uniform towards the caller; the reason (profile
//! missing or not a member) is only logged.

use std::fmt;
use std::future::Future;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::Profile;
use crate::services::ownership::{Membership, OwnershipIndex};
use crate::store::ProfileStore;

/// A resource whose ownership is checked before a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Home(Uuid),
    Device(Uuid),
}

impl Resource {
    pub fn id(&self) -> Uuid {
        match self {
            Resource::Home(id) | Resource::Device(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Home(_) => "home",
            Resource::Device(_) => "device",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id = {}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub struct AuthorizationGuard<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> AuthorizationGuard<'a, S>
where
    S: ProfileStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Loads the acting profile from the store.
    pub async fn resolve_profile(&self, profile_id: Uuid) -> Result<Profile, ServiceError> {
        match self.store.find_profile(profile_id).await? {
            Some(profile) => Ok(profile),
            None => {
                warn!(profile_id = %profile_id, "Verified identity has no stored profile");
                Err(ServiceError::Unauthenticated("cannot find profile".into()))
            }
        }
    }

    /// Checks ownership of `resource` against a fresh read of the profile.
    pub async fn check(
        &self,
        profile_id: Uuid,
        resource: Resource,
    ) -> Result<Decision, ServiceError> {
        let index = OwnershipIndex::new(self.store);
        let membership = match resource {
            Resource::Home(id) => index.check_home(profile_id, id).await?,
            Resource::Device(id) => index.check_device(profile_id, id).await?,
        };

        if membership == Membership::Member {
            return Ok(Decision::Allow);
        }

        info!(
            profile_id = %profile_id,
            resource = resource.kind(),
            resource_id = %resource.id(),
            reason = membership.as_str(),
            "Ownership check denied"
        );
        Ok(Decision::Deny)
    }

    /// Fails with `denied(resource)` unless the profile owns `resource`.
    pub async fn require(
        &self,
        profile_id: Uuid,
        resource: Resource,
        denied: impl FnOnce(Resource) -> ServiceError,
    ) -> Result<(), ServiceError> {
        match self.check(profile_id, resource).await? {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(denied(resource)),
        }
    }

    /// Runs `mutation` only if the profile owns `resource`.
    pub async fn guarded<T, F, Fut>(
        &self,
        profile_id: Uuid,
        resource: Resource,
        denied: impl FnOnce(Resource) -> ServiceError,
        mutation: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.require(profile_id, resource, denied).await?;
        mutation().await
    }
}

/// Uniform denial used by the placement protocol.
pub fn not_authorized(resource: Resource) -> ServiceError {
    ServiceError::NotAuthorized(format!("you are not the owner of {}", resource))
}
