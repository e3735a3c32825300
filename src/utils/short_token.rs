//! Short-id generation and custom-alias validation.
//!
//! Generated ids are cryptographically random; collision probability is
//! negligible but the link registry still retries on conflict.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Random bytes per token before base64 encoding (yields 12 characters).
const TOKEN_LENGTH_BYTES: usize = 9;

/// Aliases reserved for system endpoints.
const RESERVED_ALIASES: &[&str] = &[
    "api", "admin", "stats", "health", "healthz", "referrals", "suspended", "expired",
];

/// Generates a random URL-safe short id.
///
/// 9 random bytes encoded as unpadded URL-safe base64, producing a
/// 12-character token.
///
/// # Panics
///
/// Panics if the system random number generator fails.
pub fn generate_short_id() -> String {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Validates a user-provided custom short id.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot shadow a reserved system path
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_id(alias: &str) -> Result<(), AppError> {
    if alias.len() < 4 || alias.len() > 32 {
        return Err(AppError::bad_request(
            "Custom id must be 4-32 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::bad_request(
            "Custom id can only contain lowercase letters, digits, and hyphens",
            json!({ "alias": alias }),
        ));
    }

    if alias.starts_with('-') || alias.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom id cannot start or end with a hyphen",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES.contains(&alias) {
        return Err(AppError::bad_request(
            "This id is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
