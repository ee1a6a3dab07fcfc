//! Bearer JWT authentication extractor.
//!
//! Yields the verified profile id only. Handlers never trust anything else
//! from the token; services re-read the profile from the store.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::{extract_profile_id, JwtConfig, JwtError};
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Identity carried by a verified access token.
#[derive(Debug, Clone)]
pub struct ProfileAuth {
    /// Profile ID from the JWT subject claim.
    pub profile_id: Uuid,
    /// JWT ID (jti) for log correlation.
    pub jti: String,
}

impl ProfileAuth {
    /// Validates an access token and returns the identity it carries.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, JwtError> {
        let claims = jwt_config.validate_access_token(token)?;
        let profile_id = extract_profile_id(&claims)?;
        Ok(Self {
            profile_id,
            jti: claims.jti,
        })
    }

    /// Reads and verifies the `Authorization: Bearer` header.
    pub fn from_parts(parts: &Parts, jwt_config: &JwtConfig) -> Result<Self, ApiError> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        Self::validate(jwt_config, token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ProfileAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by the auth middleware.
        if let Some(auth) = parts.extensions.get::<ProfileAuth>() {
            return Ok(auth.clone());
        }
        Self::from_parts(parts, &state.jwt)
    }
}
