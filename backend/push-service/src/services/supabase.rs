/// Supabase REST client
///
/// Talks to GoTrue (`/auth/v1`) for caller identity and to PostgREST
/// (`/rest/v1`) for the `profiles` and `notification_tokens` tables. One
/// instance is built at startup and shared; it holds no mutable state.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::{IdentityProvider, RoleStore};
use crate::config::SupabaseConfig;
use crate::error::{AppError, Result};
use crate::models::CallerIdentity;
use crate::services::recipients::TokenStore;

const PROFILES_TABLE: &str = "profiles";
const TOKENS_TABLE: &str = "notification_tokens";

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenRow {
    fcm_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct TokenUpsert<'a> {
    user_id: Uuid,
    fcm_token: &'a str,
}

pub struct SupabaseClient {
    http_client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(http_client: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// PostgREST request authorised with the service-role key.
    fn service_request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    async fn error_for_status(response: reqwest::Response, what: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::Upstream(format!("{} failed with status {}: {}", what, status, body))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn resolve_user(&self, bearer: &str) -> Result<Option<CallerIdentity>> {
        let response = self
            .http_client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Auth user lookup rejected token");
            return Ok(None);
        }

        let user: AuthUser = response.json().await?;
        Ok(Some(CallerIdentity { user_id: user.id }))
    }
}

#[async_trait]
impl RoleStore for SupabaseClient {
    async fn role_of(&self, user_id: Uuid) -> Result<Option<String>> {
        let id_filter = format!("eq.{}", user_id);
        let response = self
            .service_request(reqwest::Method::GET, self.rest_url(PROFILES_TABLE))
            .query(&[("select", "role"), ("id", id_filter.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "profile lookup").await);
        }

        let rows: Vec<ProfileRow> = response.json().await?;
        Ok(rows.into_iter().next().and_then(|row| row.role))
    }
}

#[async_trait]
impl TokenStore for SupabaseClient {
    async fn list_device_tokens(&self) -> Result<Vec<String>> {
        let response = self
            .service_request(reqwest::Method::GET, self.rest_url(TOKENS_TABLE))
            .query(&[("select", "fcm_token"), ("fcm_token", "not.is.null")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "token lookup").await);
        }

        let rows: Vec<TokenRow> = response.json().await?;
        Ok(rows.into_iter().filter_map(|row| row.fcm_token).collect())
    }

    async fn upsert_device_token(&self, user_id: Uuid, token: &str) -> Result<()> {
        let response = self
            .service_request(reqwest::Method::POST, self.rest_url(TOKENS_TABLE))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&TokenUpsert {
                user_id,
                fcm_token: token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "token upsert").await);
        }

        Ok(())
    }
}
