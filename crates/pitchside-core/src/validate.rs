//! Shared validation rules for user-supplied names.

use crate::error::{NameError, ProfileNameError};

/// Maximum length for entity names (regions, fields, teams, schedules).
pub const MAX_NAME_LEN: usize = 64;

/// Validates an entity name: non-empty after trimming, at most 64 chars.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let content = name.trim();
    let len = content.len();

    if content.is_empty() {
        return Err(NameError::EmptyName);
    }

    if len > MAX_NAME_LEN {
        return Err(NameError::NameTooLong { len });
    }

    Ok(())
}

/// Validates a profile name: `[A-Za-z0-9_\- ]{1,64}`.
///
/// Profiles name filesystem-adjacent datasets, so the character set is
/// deliberately narrower than entity names.
pub fn validate_profile_name(name: &str) -> Result<(), ProfileNameError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ProfileNameError::InvalidProfileName);
    }

    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
    {
        Ok(())
    } else {
        Err(ProfileNameError::InvalidProfileName)
    }
}
