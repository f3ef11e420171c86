//! Caller authentication and authorization.
//!
//! A bearer token is resolved to a user by the identity provider, then the
//! user's role is looked up in the role store. Both collaborators sit behind
//! traits so the gate can run against in-memory fakes.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CallerIdentity, ADMIN_ROLE};

/// Resolves a bearer token to a user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the provider does not recognise the token.
    async fn resolve_user(&self, bearer: &str) -> Result<Option<CallerIdentity>>;
}

/// Looks up a user's role.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn role_of(&self, user_id: Uuid) -> Result<Option<String>>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AppError::Unauthenticated);
    }
    Ok(token)
}

pub struct CallerAuthorizer {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<dyn RoleStore>,
}

impl CallerAuthorizer {
    pub fn new(identity: Arc<dyn IdentityProvider>, roles: Arc<dyn RoleStore>) -> Self {
        Self { identity, roles }
    }

    /// Any caller the identity provider recognises.
    pub async fn authenticate(&self, bearer: &str) -> Result<CallerIdentity> {
        match self.identity.resolve_user(bearer).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => {
                debug!("Bearer token not recognised by identity provider");
                Err(AppError::Unauthenticated)
            }
            Err(e) => {
                warn!(error = %e, "Identity provider lookup failed");
                Err(AppError::Unauthenticated)
            }
        }
    }

    /// Authenticated caller whose role is exactly `admin`.
    pub async fn authorize_admin(&self, bearer: &str) -> Result<CallerIdentity> {
        let identity = self.authenticate(bearer).await?;

        let role = match self.roles.role_of(identity.user_id).await {
            Ok(role) => role,
            Err(e) => {
                warn!(user_id = %identity.user_id, error = %e, "Role lookup failed");
                None
            }
        };

        if role.as_deref() != Some(ADMIN_ROLE) {
            warn!(user_id = %identity.user_id, role = ?role, "Rejected non-admin caller");
            return Err(AppError::Forbidden);
        }

        Ok(identity)
    }
}
