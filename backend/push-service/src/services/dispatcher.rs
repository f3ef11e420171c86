/// Fan-out dispatcher
///
/// Sends one message per recipient token with bounded concurrency. A failed
/// delivery never aborts the batch: it is classified, logged and counted,
/// and only the aggregate `sent` count is reported back.
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use gala_fcm_shared::{AccessToken, FCMClient, FCMError, FcmNotification};
use std::sync::Arc;
use tracing::{info, warn};

use crate::metrics;
use crate::models::DispatchResult;

/// Delivers one notification to one device.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(
        &self,
        access_token: &AccessToken,
        project_id: &str,
        device_token: &str,
        notification: &FcmNotification,
    ) -> Result<(), FCMError>;
}

#[async_trait]
impl PushGateway for FCMClient {
    async fn send(
        &self,
        access_token: &AccessToken,
        project_id: &str,
        device_token: &str,
        notification: &FcmNotification,
    ) -> Result<(), FCMError> {
        FCMClient::send(self, access_token, project_id, device_token, notification)
            .await
            .map(|_| ())
    }
}

/// Coarse cause of a failed delivery, used for logs and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// Token expired, revoked or never valid for this project
    Unregistered,
    InvalidArgument,
    Auth,
    Quota,
    Server,
    Transport,
    Other,
}

impl DeliveryFailure {
    pub fn classify(err: &FCMError) -> Self {
        match err {
            FCMError::Transport(_) => DeliveryFailure::Transport,
            FCMError::Delivery { status, body } => {
                if body.contains("UNREGISTERED") || *status == 404 {
                    DeliveryFailure::Unregistered
                } else if body.contains("INVALID_ARGUMENT") || *status == 400 {
                    DeliveryFailure::InvalidArgument
                } else if *status == 401 || *status == 403 {
                    DeliveryFailure::Auth
                } else if *status == 429 {
                    DeliveryFailure::Quota
                } else if *status >= 500 {
                    DeliveryFailure::Server
                } else {
                    DeliveryFailure::Other
                }
            }
            _ => DeliveryFailure::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryFailure::Unregistered => "unregistered",
            DeliveryFailure::InvalidArgument => "invalid_argument",
            DeliveryFailure::Auth => "auth",
            DeliveryFailure::Quota => "quota",
            DeliveryFailure::Server => "server",
            DeliveryFailure::Transport => "transport",
            DeliveryFailure::Other => "other",
        }
    }
}

/// First characters of a device token, enough to correlate log lines.
fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(12)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

pub struct FanOutDispatcher {
    gateway: Arc<dyn PushGateway>,
    max_concurrency: usize,
}

impl FanOutDispatcher {
    pub fn new(gateway: Arc<dyn PushGateway>, max_concurrency: usize) -> Self {
        Self {
            gateway,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub async fn dispatch(
        &self,
        access_token: &AccessToken,
        project_id: &str,
        notification: &FcmNotification,
        tokens: &[String],
    ) -> DispatchResult {
        let total = tokens.len();

        let sent = stream::iter(tokens)
            .map(move |token| async move {
                match self
                    .gateway
                    .send(access_token, project_id, token, notification)
                    .await
                {
                    Ok(()) => {
                        metrics::record_delivery_success();
                        true
                    }
                    Err(e) => {
                        let failure = DeliveryFailure::classify(&e);
                        metrics::record_delivery_failure(failure.as_str());
                        warn!(
                            token = %token_prefix(token),
                            class = failure.as_str(),
                            error = %e,
                            "Push delivery failed"
                        );
                        false
                    }
                }
            })
            .buffer_unordered(self.max_concurrency)
            .fold(0usize, |sent, delivered| async move {
                if delivered {
                    sent + 1
                } else {
                    sent
                }
            })
            .await;

        info!(sent, total, "Fan-out complete");

        DispatchResult { sent, total }
    }
}
