/// HTTP handlers for push service API
pub mod devices;
pub mod send_push;

pub use devices::register_device;
pub use send_push::send_push;

use actix_cors::Cors;
use actix_web::{web, HttpResponse};

/// Headers browsers may send on cross-origin calls, matching what the
/// Supabase JS client attaches.
pub const CORS_ALLOWED_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

/// CORS policy: echo the request origin, allow `POST` and `OPTIONS`.
pub fn cors_policy(max_age_secs: usize) -> Cors {
    Cors::default()
        .allowed_origin_fn(|_origin, _req_head| true)
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allowed_headers(CORS_ALLOWED_HEADERS)
        .max_age(max_age_secs)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/send-push", web::post().to(send_push))
        .route("/push-tokens", web::post().to(register_device))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics));
}
