/// Push dispatch pipeline
///
/// Authorize → resolve recipients → mint assertion → exchange for an access
/// token → fan out. Every invocation mints and exchanges its own credential
/// and re-reads the recipient list; nothing carries over between calls.
use chrono::Utc;
use gala_fcm_shared::{mint_assertion, AssertionSigner, FcmNotification, ServiceAccountKey, TokenExchanger};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::CallerAuthorizer;
use crate::error::Result;
use crate::models::{CallerIdentity, DispatchResult};
use crate::services::dispatcher::FanOutDispatcher;
use crate::services::recipients::RecipientResolver;

pub struct PushDispatchService {
    authorizer: CallerAuthorizer,
    recipients: RecipientResolver,
    signer: Arc<dyn AssertionSigner>,
    exchanger: Arc<dyn TokenExchanger>,
    dispatcher: FanOutDispatcher,
    credential: Arc<ServiceAccountKey>,
}

impl PushDispatchService {
    pub fn new(
        authorizer: CallerAuthorizer,
        recipients: RecipientResolver,
        signer: Arc<dyn AssertionSigner>,
        exchanger: Arc<dyn TokenExchanger>,
        dispatcher: FanOutDispatcher,
        credential: Arc<ServiceAccountKey>,
    ) -> Self {
        Self {
            authorizer,
            recipients,
            signer,
            exchanger,
            dispatcher,
            credential,
        }
    }

    pub fn authorizer(&self) -> &CallerAuthorizer {
        &self.authorizer
    }

    /// Gate for broadcasting: the caller must be an admin.
    pub async fn authorize_sender(&self, bearer: &str) -> Result<CallerIdentity> {
        self.authorizer.authorize_admin(bearer).await
    }

    /// Broadcast to every registered device. The caller must already have
    /// passed [`authorize_sender`](Self::authorize_sender).
    #[instrument(skip_all, fields(caller = %caller.user_id))]
    pub async fn dispatch(
        &self,
        caller: &CallerIdentity,
        notification: &FcmNotification,
    ) -> Result<DispatchResult> {
        let tokens = self.recipients.resolve().await?;
        if tokens.is_empty() {
            info!("No registered devices, nothing to send");
            return Ok(DispatchResult::default());
        }

        let assertion = mint_assertion(self.signer.as_ref(), &self.credential, Utc::now())?;
        let access_token = self.exchanger.exchange(&assertion).await?;

        let result = self
            .dispatcher
            .dispatch(
                &access_token,
                &self.credential.project_id,
                notification,
                &tokens,
            )
            .await;

        Ok(result)
    }

    /// Store a device token for an authenticated caller.
    pub async fn register_device(&self, caller: &CallerIdentity, token: &str) -> Result<()> {
        self.recipients.register(caller.user_id, token).await?;
        info!(user_id = %caller.user_id, "Registered push device token");
        Ok(())
    }
}
