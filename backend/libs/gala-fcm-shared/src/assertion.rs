//! Signed assertions for the OAuth2 JWT-bearer grant.
//!
//! Claim building is pure; signing is behind [`AssertionSigner`] so callers
//! can substitute a fake signer in tests.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::errors::FCMError;
use crate::models::{JwtClaims, ServiceAccountKey, SignedAssertion, FCM_MESSAGING_SCOPE, GOOGLE_TOKEN_URI};

/// Lifetime of a signed assertion. Google rejects anything longer.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

impl JwtClaims {
    /// Claim set valid from `issued_at` to `issued_at + 3600s`, with the
    /// service account acting as both issuer and subject.
    pub fn for_service_account(
        credential: &ServiceAccountKey,
        audience: &str,
        scope: &str,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: credential.client_email.clone(),
            sub: credential.client_email.clone(),
            scope: scope.to_string(),
            aud: audience.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Signs a claim set into a compact JWT.
pub trait AssertionSigner: Send + Sync {
    fn sign(&self, claims: &JwtClaims) -> Result<SignedAssertion, FCMError>;
}

/// RS256 signer backed by the service account's PEM private key.
///
/// The key is parsed on every call so a broken key surfaces as a
/// `Credential` error on the dispatch that needed it.
pub struct RsaAssertionSigner {
    private_key_pem: String,
}

impl RsaAssertionSigner {
    pub fn new(private_key_pem: impl Into<String>) -> Self {
        Self {
            private_key_pem: private_key_pem.into(),
        }
    }

    pub fn from_service_account(credential: &ServiceAccountKey) -> Self {
        Self::new(credential.private_key.clone())
    }

    /// Check that the key parses without signing anything.
    pub fn validate(&self) -> Result<(), FCMError> {
        self.encoding_key().map(|_| ())
    }

    fn encoding_key(&self) -> Result<EncodingKey, FCMError> {
        EncodingKey::from_rsa_pem(self.private_key_pem.as_bytes())
            .map_err(|e| FCMError::Credential(e.to_string()))
    }
}

impl AssertionSigner for RsaAssertionSigner {
    fn sign(&self, claims: &JwtClaims) -> Result<SignedAssertion, FCMError> {
        let encoding_key = self.encoding_key()?;

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());

        let jwt = encode(&header, claims, &encoding_key)
            .map_err(|e| FCMError::Signing(e.to_string()))?;

        Ok(SignedAssertion::new(jwt))
    }
}

/// Mint a fresh assertion for the FCM messaging scope, audience-bound to the
/// Google token endpoint.
pub fn mint_assertion(
    signer: &dyn AssertionSigner,
    credential: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<SignedAssertion, FCMError> {
    let claims =
        JwtClaims::for_service_account(credential, GOOGLE_TOKEN_URI, FCM_MESSAGING_SCOPE, now);
    tracing::debug!(iss = %claims.iss, exp = claims.exp, "Minting signed assertion");
    signer.sign(&claims)
}
