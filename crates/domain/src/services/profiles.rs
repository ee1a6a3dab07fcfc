//! Profile provisioning and API token rotation.

use shared::crypto::{generate_api_token, hash_api_token};
use shared::ids::parse_resource_id;
use tracing::info;
use uuid::Uuid;

use crate::error::{ServiceError, StoreError};
use crate::models::profile::ApiTokenResponse;
use crate::models::{ExternalIdentity, Profile};
use crate::services::guard::AuthorizationGuard;
use crate::store::ProfileStore;

/// Result of a sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub profile: Profile,
    /// Plain API token, only present when the profile was just created.
    pub issued_api_token: Option<String>,
}

pub struct ProfileService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ProfileService<'a, S>
where
    S: ProfileStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Finds the profile linked to an external identity, creating it on the
    /// first login.
    pub async fn sign_in(&self, identity: ExternalIdentity) -> Result<SignIn, ServiceError> {
        if let Some(profile) = self
            .store
            .find_profile_by_provider_id(&identity.provider_id)
            .await?
        {
            return Ok(SignIn {
                profile,
                issued_api_token: None,
            });
        }

        let api_token = generate_api_token();
        let profile = Profile::new(identity, hash_api_token(&api_token));

        match self.store.insert_profile(&profile).await {
            Ok(()) => {
                info!(profile_id = %profile.id, login = %profile.identity.login, "Profile created");
                Ok(SignIn {
                    profile,
                    issued_api_token: Some(api_token),
                })
            }
            // Another login for the same identity won the race.
            Err(StoreError::Duplicate(_)) => {
                let existing = self
                    .store
                    .find_profile_by_provider_id(&profile.identity.provider_id)
                    .await?
                    .ok_or_else(|| StoreError::Backend("profile vanished after conflict".into()))?;
                Ok(SignIn {
                    profile: existing,
                    issued_api_token: None,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The caller's profile, read from the store.
    pub async fn current(&self, profile_id: Uuid) -> Result<Profile, ServiceError> {
        AuthorizationGuard::new(self.store)
            .resolve_profile(profile_id)
            .await
    }

    /// Issues a new API token. A profile may only rotate its own token.
    pub async fn rotate_api_token(
        &self,
        profile_id: Uuid,
        target_profile_id: &str,
    ) -> Result<ApiTokenResponse, ServiceError> {
        let target = parse_resource_id(target_profile_id, "profileId")?;
        if target != profile_id {
            return Err(ServiceError::NotOwned(
                "cannot re-generate APIToken for a different profile than yours".into(),
            ));
        }

        let api_token = generate_api_token();
        if !self
            .store
            .set_api_token_hash(profile_id, &hash_api_token(&api_token))
            .await?
        {
            return Err(ServiceError::Unauthenticated("cannot find profile".into()));
        }

        info!(profile_id = %profile_id, "API token rotated");
        Ok(ApiTokenResponse { api_token })
    }
}
