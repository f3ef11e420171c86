use crate::errors::FCMError;
use crate::models::*;

/// Firebase Cloud Messaging Client
///
/// Delivers one message to one device through the FCM HTTP v1 API. The
/// caller supplies the access token for every call; the client never caches
/// one.
pub struct FCMClient {
    http_client: reqwest::Client,
    base_url: String,
    icon: Option<String>,
}

impl FCMClient {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: FCM_BASE_URL.to_string(),
            icon: None,
        }
    }

    /// Override the API host, e.g. `https://fcm.googleapis.com`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Icon hint attached to the webpush section of every message.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn messages_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}/messages:send", self.base_url, project_id)
    }

    /// Send notification via FCM to a single device
    pub async fn send(
        &self,
        access_token: &AccessToken,
        project_id: &str,
        device_token: &str,
        notification: &FcmNotification,
    ) -> Result<FCMSendResult, FCMError> {
        let message = FcmMessage {
            message: FcmMessageContent {
                token: device_token.to_string(),
                notification: notification.clone(),
                webpush: self.icon.as_ref().map(|icon| WebpushConfig {
                    notification: WebpushNotification { icon: icon.clone() },
                }),
            },
        };

        let response = self
            .http_client
            .post(self.messages_url(project_id))
            .bearer_auth(access_token.as_str())
            .json(&message)
            .send()
            .await
            .map_err(|e| FCMError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            // A 2xx is a delivery even if the body is not what we expect.
            let message_id = response
                .json::<FcmApiResponse>()
                .await
                .ok()
                .and_then(|r| r.name);
            return Ok(FCMSendResult { message_id });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(FCMError::Delivery {
            status: status.as_u16(),
            body,
        })
    }

    /// Validate device token format
    pub fn validate_token(device_token: &str) -> bool {
        // FCM tokens are typically 100-200 characters
        let len = device_token.trim().len();
        (10..=1000).contains(&len)
    }
}
