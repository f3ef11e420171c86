use thiserror::Error;

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error("Invalid service account: {0}")]
    InvalidServiceAccount(String),

    #[error("Failed to parse private key: {0}")]
    Credential(String),

    #[error("Failed to encode JWT: {0}")]
    Signing(String),

    /// Carries the token authority's response body verbatim when it has one.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("FCM API error: {status} - {body}")]
    Delivery { status: u16, body: String },

    #[error("FCM send request failed: {0}")]
    Transport(String),
}

impl FCMError {
    /// True for failures that happen before any message leaves the process:
    /// a bad service account or an unusable signing key.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            FCMError::InvalidServiceAccount(_) | FCMError::Credential(_) | FCMError::Signing(_)
        )
    }
}

impl From<FCMError> for String {
    fn from(err: FCMError) -> Self {
        err.to_string()
    }
}
