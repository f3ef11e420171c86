/// Error types for Push Service
///
/// Every variant renders as `{"error": "<message>"}` with the matching HTTP
/// status.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use gala_fcm_shared::FCMError;

use crate::models::ErrorBody;

/// Result type for push-service operations
pub type Result<T> = std::result::Result<T, AppError>;

pub const NOT_AUTHENTICATED: &str = "Not authenticated";
pub const FORBIDDEN: &str = "Forbidden";
pub const TITLE_AND_BODY_REQUIRED: &str = "title and body are required";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or incomplete request payload
    #[error("{0}")]
    Validation(String),

    /// Missing bearer token, or the identity provider did not recognise it
    #[error("Not authenticated")]
    Unauthenticated,

    /// Authenticated, but not allowed to do this
    #[error("Forbidden")]
    Forbidden,

    /// Service account key could not be parsed or used for signing
    #[error("Credential error: {0}")]
    Credential(String),

    /// Token authority rejected the assertion; carries its response body
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Any other failure in a collaborator (backend store, transport)
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Credential(_)
            | AppError::TokenExchange(_)
            | AppError::Upstream(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<FCMError> for AppError {
    fn from(err: FCMError) -> Self {
        match err {
            FCMError::TokenExchange(body) => AppError::TokenExchange(body),
            e if e.is_credential_error() => AppError::Credential(e.to_string()),
            e => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation(TITLE_AND_BODY_REQUIRED.to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::TokenExchange("{}".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(AppError::Unauthenticated.to_string(), NOT_AUTHENTICATED);
        assert_eq!(AppError::Forbidden.to_string(), FORBIDDEN);
        assert_eq!(
            AppError::Validation(TITLE_AND_BODY_REQUIRED.to_string()).to_string(),
            TITLE_AND_BODY_REQUIRED
        );
    }

    #[test]
    fn test_fcm_error_mapping() {
        let err: AppError = FCMError::Credential("bad pem".to_string()).into();
        assert!(matches!(err, AppError::Credential(_)));

        let err: AppError = FCMError::TokenExchange(r#"{"error":"invalid_grant"}"#.to_string()).into();
        match err {
            AppError::TokenExchange(body) => assert_eq!(body, r#"{"error":"invalid_grant"}"#),
            other => panic!("unexpected: {other:?}"),
        }

        let err: AppError = FCMError::Transport("connection reset".to_string()).into();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
