use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Device tokens registered for push delivery.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Every non-null device token, in store order.
    async fn list_device_tokens(&self) -> Result<Vec<String>>;

    async fn upsert_device_token(&self, user_id: Uuid, token: &str) -> Result<()>;
}

/// Fetches the recipient list for a dispatch. Tokens are re-read on every
/// call since devices rotate and revoke them at any time.
pub struct RecipientResolver {
    store: Arc<dyn TokenStore>,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self) -> Result<Vec<String>> {
        let tokens = self.store.list_device_tokens().await?;
        debug!(count = tokens.len(), "Resolved push recipients");
        Ok(tokens)
    }

    pub async fn register(&self, user_id: Uuid, token: &str) -> Result<()> {
        self.store.upsert_device_token(user_id, token).await
    }
}
