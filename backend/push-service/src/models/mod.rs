use gala_fcm_shared::{FCMClient, FcmNotification};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, TITLE_AND_BODY_REQUIRED};

/// The only role allowed to broadcast notifications.
pub const ADMIN_ROLE: &str = "admin";

/// Body of `POST /send-push`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendPushRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl SendPushRequest {
    /// Parse and validate a raw request body. Anything other than a JSON
    /// object with non-empty string `title` and `body` is rejected.
    pub fn parse(raw: &[u8]) -> Result<FcmNotification, AppError> {
        let request: SendPushRequest = serde_json::from_slice(raw)
            .map_err(|_| AppError::Validation(TITLE_AND_BODY_REQUIRED.to_string()))?;
        request.into_notification()
    }

    pub fn into_notification(self) -> Result<FcmNotification, AppError> {
        match (self.title, self.body) {
            (Some(title), Some(body)) if !title.is_empty() && !body.is_empty() => {
                Ok(FcmNotification { title, body })
            }
            _ => Err(AppError::Validation(TITLE_AND_BODY_REQUIRED.to_string())),
        }
    }
}

/// Aggregate outcome of one fan-out. `total` counts attempts, `sent` counts
/// deliveries the gateway accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub sent: usize,
    pub total: usize,
}

/// Identity resolved from a caller's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
}

/// Body of `POST /push-tokens`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterTokenRequest {
    pub token: Option<String>,
}

impl RegisterTokenRequest {
    pub fn parse(raw: &[u8]) -> Result<String, AppError> {
        let request: RegisterTokenRequest = serde_json::from_slice(raw)
            .map_err(|_| AppError::Validation("token is required".to_string()))?;

        match request.token {
            Some(token) if FCMClient::validate_token(&token) => Ok(token.trim().to_string()),
            Some(_) => Err(AppError::Validation("token is malformed".to_string())),
            None => Err(AppError::Validation("token is required".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTokenResponse {
    pub registered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
