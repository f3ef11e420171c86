use gala_fcm_shared::models::{FCM_BASE_URL, GOOGLE_TOKEN_URI};
use gala_fcm_shared::ServiceAccountKey;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub supabase: SupabaseConfig,
    pub fcm: FcmConfig,
    pub push: PushConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub service_account: Arc<ServiceAccountKey>,
    pub base_url: String,
    pub token_uri: String,
    pub icon: String,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Upper bound on in-flight delivery requests per dispatch.
    pub max_concurrency: usize,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub max_age_secs: usize,
}

/// Raw environment, as read by `envy`. Variable names are the upper-cased
/// field names.
#[derive(Deserialize)]
struct Env {
    #[serde(default = "default_host")]
    app_host: String,
    #[serde(default = "default_port")]
    app_port: u16,
    supabase_url: String,
    service_role_key: String,
    firebase_service_account_json_b64: String,
    #[serde(default = "default_icon")]
    push_icon: String,
    #[serde(default = "default_max_concurrency")]
    push_max_concurrency: usize,
    #[serde(default = "default_http_timeout_secs")]
    http_timeout_secs: u64,
    #[serde(default = "default_fcm_base_url")]
    fcm_base_url: String,
    #[serde(default = "default_token_uri")]
    oauth_token_uri: String,
    #[serde(default = "default_cors_max_age")]
    cors_max_age_secs: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_icon() -> String {
    "/icons/gala-192.png".to_string()
}

fn default_max_concurrency() -> usize {
    8
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_fcm_base_url() -> String {
    FCM_BASE_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

fn default_cors_max_age() -> usize {
    3600
}

impl Config {
    /// Load from the process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let env = envy::from_env::<Env>().map_err(|e| AppError::Config(e.to_string()))?;
        Self::from_raw(env)
    }

    /// Load from explicit key/value pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::from_iter::<_, Env>(vars).map_err(|e| AppError::Config(e.to_string()))?;
        Self::from_raw(env)
    }

    fn from_raw(env: Env) -> Result<Self, AppError> {
        if env.supabase_url.trim().is_empty() {
            return Err(AppError::Config("SUPABASE_URL is empty".to_string()));
        }
        if env.push_max_concurrency == 0 {
            return Err(AppError::Config(
                "PUSH_MAX_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let service_account =
            ServiceAccountKey::from_base64_json(&env.firebase_service_account_json_b64)
                .map_err(|e| AppError::Config(format!("FIREBASE_SERVICE_ACCOUNT_JSON_B64: {}", e)))?;

        Ok(Config {
            app: AppConfig {
                host: env.app_host,
                port: env.app_port,
            },
            supabase: SupabaseConfig {
                url: env.supabase_url.trim_end_matches('/').to_string(),
                service_role_key: env.service_role_key,
            },
            fcm: FcmConfig {
                service_account: Arc::new(service_account),
                base_url: env.fcm_base_url,
                token_uri: env.oauth_token_uri,
                icon: env.push_icon,
            },
            push: PushConfig {
                max_concurrency: env.push_max_concurrency,
                http_timeout: Duration::from_secs(env.http_timeout_secs),
            },
            cors: CorsConfig {
                max_age_secs: env.cors_max_age_secs,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
