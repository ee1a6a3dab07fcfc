//! Ownership index.
//!
//! Answers "does this profile own that home/device" from a freshly fetched
//! profile document. Callers never pass a profile in; a copy held by the
//! caller may predate a concurrent home or device (un)registration.

use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Profile;
use crate::store::ProfileStore;

/// Outcome of a membership lookup, kept precise for server-side logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Member,
    NotMember,
    ProfileMissing,
}

impl Membership {
    pub fn is_member(self) -> bool {
        self == Membership::Member
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Membership::Member => "member",
            Membership::NotMember => "not_member",
            Membership::ProfileMissing => "profile_missing",
        }
    }
}

fn membership(profile: Option<&Profile>, test: impl FnOnce(&Profile) -> bool) -> Membership {
    match profile {
        None => Membership::ProfileMissing,
        Some(profile) if test(profile) => Membership::Member,
        Some(_) => Membership::NotMember,
    }
}

/// Read-only ownership checks over the profile collection.
pub struct OwnershipIndex<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> OwnershipIndex<'a, S>
where
    S: ProfileStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn check_home(
        &self,
        profile_id: Uuid,
        home_id: Uuid,
    ) -> Result<Membership, StoreError> {
        let profile = self.store.find_profile(profile_id).await?;
        Ok(membership(profile.as_ref(), |p| p.has_home(home_id)))
    }

    pub async fn check_device(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<Membership, StoreError> {
        let profile = self.store.find_profile(profile_id).await?;
        Ok(membership(profile.as_ref(), |p| p.has_device(device_id)))
    }

    /// False for a missing profile as well as for a non-member. Store
    /// failures are returned as errors, never as `false`.
    pub async fn owns_home(&self, profile_id: Uuid, home_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.check_home(profile_id, home_id).await?.is_member())
    }

    pub async fn owns_device(&self, profile_id: Uuid, device_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.check_device(profile_id, device_id).await?.is_member())
    }
}
