use actix_web::{web, App, HttpServer};
use anyhow::Context;
use gala_fcm_shared::{FCMClient, OAuthTokenExchanger, RsaAssertionSigner};
use push_service::auth::CallerAuthorizer;
use push_service::handlers::{cors_policy, register_routes};
use push_service::{
    metrics, Config, FanOutDispatcher, PushDispatchService, RecipientResolver, SupabaseClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting push service");

    let config = Config::from_env().context("Failed to load configuration")?;

    let http_client = reqwest::Client::builder()
        .timeout(config.push.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let supabase = Arc::new(SupabaseClient::new(http_client.clone(), &config.supabase));

    let signer = RsaAssertionSigner::from_service_account(&config.fcm.service_account);
    if let Err(e) = signer.validate() {
        // Not fatal: the failure is reported on each dispatch that needs it.
        tracing::error!(error = %e, "Service account private key does not parse");
    }

    let exchanger =
        OAuthTokenExchanger::new(http_client.clone()).with_token_uri(config.fcm.token_uri.clone());

    let fcm_client = FCMClient::new(http_client)
        .with_base_url(config.fcm.base_url.clone())
        .with_icon(config.fcm.icon.clone());

    let service = web::Data::new(PushDispatchService::new(
        CallerAuthorizer::new(supabase.clone(), supabase.clone()),
        RecipientResolver::new(supabase),
        Arc::new(signer),
        Arc::new(exchanger),
        FanOutDispatcher::new(Arc::new(fcm_client), config.push.max_concurrency),
        config.fcm.service_account.clone(),
    ));

    let addr = config.bind_address();
    let cors_max_age = config.cors.max_age_secs;

    tracing::info!(
        project_id = %config.fcm.service_account.project_id,
        max_concurrency = config.push.max_concurrency,
        "Starting HTTP server on {}",
        addr
    );

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(cors_policy(cors_max_age))
            .wrap(metrics::MetricsMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(register_routes)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await
    .context("HTTP server error")
}
