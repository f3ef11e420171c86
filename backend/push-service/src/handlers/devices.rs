/// Device token registration
use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::extract_bearer;
use crate::error::Result;
use crate::models::{RegisterTokenRequest, RegisterTokenResponse};
use crate::services::PushDispatchService;

/// Register the caller's device token
///
/// POST /push-tokens
pub async fn register_device(
    req: HttpRequest,
    service: web::Data<PushDispatchService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let bearer = extract_bearer(req.headers())?;
    let caller = service.authorizer().authenticate(bearer).await?;

    let token = RegisterTokenRequest::parse(&body)?;
    service.register_device(&caller, &token).await?;

    Ok(HttpResponse::Ok().json(RegisterTokenResponse { registered: true }))
}
