use async_trait::async_trait;

use crate::errors::FCMError;
use crate::models::{AccessToken, GoogleTokenResponse, SignedAssertion, GOOGLE_TOKEN_URI};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Trades a signed assertion for a short-lived access token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, assertion: &SignedAssertion) -> Result<AccessToken, FCMError>;
}

/// JWT-bearer grant against an OAuth2 token endpoint. No retries: a failed
/// exchange is reported to the caller as-is.
pub struct OAuthTokenExchanger {
    http_client: reqwest::Client,
    token_uri: String,
}

impl OAuthTokenExchanger {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }

    /// Override the token endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }
}

#[async_trait]
impl TokenExchanger for OAuthTokenExchanger {
    async fn exchange(&self, assertion: &SignedAssertion) -> Result<AccessToken, FCMError> {
        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FCMError::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Token endpoint rejected assertion");
            return Err(FCMError::TokenExchange(body));
        }

        let token_response: GoogleTokenResponse =
            serde_json::from_str(&body).map_err(|_| FCMError::TokenExchange(body.clone()))?;

        tracing::debug!(
            expires_in = token_response.expires_in,
            token_type = %token_response.token_type,
            "Exchanged assertion for access token"
        );

        Ok(AccessToken::new(token_response.access_token))
    }
}
