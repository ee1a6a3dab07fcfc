//! Common validation utilities.

use uuid::Uuid;
use validator::ValidationError;

/// Validates that an API token has the shape issued by [`crate::crypto::generate_api_token`]:
/// a hyphenated, version 4 UUID.
pub fn validate_api_token(token: &str) -> Result<(), ValidationError> {
    let valid = token.len() == 36
        && Uuid::try_parse(token)
            .map(|uuid| uuid.get_version_num() == 4)
            .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("api_token_format");
        err.message = Some("API token must be a UUIDv4 string".into());
        Err(err)
    }
}

/// Validates that a display name is not made of whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
