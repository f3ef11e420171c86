use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::FCMError;

/// Google OAuth2 token endpoint. Also the audience of every signed assertion.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 scope required to call the FCM HTTP v1 API.
pub const FCM_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Default host of the FCM HTTP v1 API.
pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Firebase Service Account Key
///
/// Only `project_id`, `private_key` and `client_email` are required; the
/// remaining fields of the downloaded JSON are accepted but optional.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse the service account JSON document.
    pub fn from_json(json: &str) -> Result<Self, FCMError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| FCMError::InvalidServiceAccount(e.to_string()))?;

        if key.client_email.trim().is_empty() {
            return Err(FCMError::InvalidServiceAccount(
                "client_email is empty".to_string(),
            ));
        }
        if key.project_id.trim().is_empty() {
            return Err(FCMError::InvalidServiceAccount(
                "project_id is empty".to_string(),
            ));
        }

        Ok(key)
    }

    /// Parse a base64-encoded service account JSON document, the form in
    /// which the secret is injected through the environment.
    pub fn from_base64_json(encoded: &str) -> Result<Self, FCMError> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| FCMError::InvalidServiceAccount(format!("base64: {}", e)))?;
        let json = String::from_utf8(raw)
            .map_err(|e| FCMError::InvalidServiceAccount(format!("utf-8: {}", e)))?;
        Self::from_json(&json)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[redacted]")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Compact RS256 JWT proving the service identity to the token authority.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedAssertion(String);

impl SignedAssertion {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self(jwt.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignedAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedAssertion([redacted])")
    }
}

/// Short-lived OAuth2 bearer token for the FCM API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

/// FCM Message Request
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: FcmMessageContent,
}

/// FCM Message Content
#[derive(Debug, Serialize)]
pub struct FcmMessageContent {
    pub token: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<WebpushConfig>,
}

/// FCM Notification Payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct WebpushConfig {
    pub notification: WebpushNotification,
}

#[derive(Debug, Serialize)]
pub struct WebpushNotification {
    pub icon: String,
}

/// FCM API Response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// FCM Send Result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FCMSendResult {
    pub message_id: Option<String>,
}
