//! Gala FCM Shared Library
//!
//! Firebase Cloud Messaging plumbing for the Gala push service:
//! - signed assertions for Google service accounts
//! - the OAuth2 JWT-bearer token exchange
//! - single-device message delivery over the FCM HTTP v1 API
//!
//! Nothing here caches credentials. Each dispatch mints its own assertion
//! and exchanges it for its own access token.

pub mod assertion;
pub mod client;
pub mod errors;
pub mod models;
pub mod token;

pub use assertion::{mint_assertion, AssertionSigner, RsaAssertionSigner};
pub use client::FCMClient;
pub use errors::FCMError;
pub use models::{
    AccessToken, FCMSendResult, FcmNotification, JwtClaims, ServiceAccountKey, SignedAssertion,
};
pub use token::{OAuthTokenExchanger, TokenExchanger};
