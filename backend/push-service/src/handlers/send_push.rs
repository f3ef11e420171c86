/// Broadcast handler
use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::extract_bearer;
use crate::error::Result;
use crate::models::SendPushRequest;
use crate::services::PushDispatchService;

/// Send a notification to every registered device
///
/// POST /send-push
///
/// The caller is authorized before the payload is looked at, so an
/// unauthenticated request is a 401 whatever its body.
pub async fn send_push(
    req: HttpRequest,
    service: web::Data<PushDispatchService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let bearer = extract_bearer(req.headers())?;
    let caller = service.authorize_sender(bearer).await?;

    let notification = SendPushRequest::parse(&body)?;

    let result = service.dispatch(&caller, &notification).await?;
    Ok(HttpResponse::Ok().json(result))
}
