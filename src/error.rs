//! Error taxonomy.
//!
//! Nothing here is fatal: validation errors are shown inline, service errors
//! become a short status line, storage and capability errors are logged and
//! swallowed by their adapters.

use thiserror::Error;

/// User input failed a local rule. Never leaves the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ENTER DEVICE MODEL")]
    EmptyDeviceModel,

    #[error("INVALID MODEL NAME")]
    DeviceModelTooShort,

    #[error("Invalid email or password too short.")]
    InvalidEmailOrPassword,

    #[error("Invalid phone number.")]
    InvalidPhone,

    #[error("Preset name cannot be empty.")]
    EmptyPresetName,

    #[error("Invalid code (too short).")]
    CodeTooShort,
}

/// The generative backend failed or returned something we refuse to trust.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("AI client not configured: missing API key")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("no data received from the service")]
    Empty,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    Invalid(String),
}

impl GenerationError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, GenerationError::NotConfigured)
    }
}

/// Key-value store failures. Caught by [`crate::store::Persistence`].
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A device capability (vibration, notification, clipboard) is missing or
/// refused the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("capability not available on this host: {0}")]
    Unavailable(&'static str),

    #[error("permission denied for {0}")]
    PermissionDenied(&'static str),

    #[error("capability call failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("authentication service error: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum RedeemError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Redemption service is not configured.")]
    Unavailable,

    #[error("ERROR: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_inline_text() {
        assert_eq!(
            ValidationError::EmptyDeviceModel.to_string(),
            "ENTER DEVICE MODEL"
        );
        assert_eq!(
            ValidationError::InvalidEmailOrPassword.to_string(),
            "Invalid email or password too short."
        );
        assert_eq!(
            ValidationError::CodeTooShort.to_string(),
            "Invalid code (too short)."
        );
    }

    #[test]
    fn auth_error_is_transparent_over_validation() {
        let err: AuthError = ValidationError::InvalidPhone.into();
        assert_eq!(err.to_string(), "Invalid phone number.");
    }
}
