use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::*;

use super::{client_ip, ensure_admin, require_email, wants, AppState};

/// Public signup. The opaque token returned in the row is the only handle
/// for later unsubscription.
#[utoipa::path(
    post,
    path = "/api/v1/newsletter/subscriptions",
    request_body = NewSubscriber,
    responses(
        (status = 201, body = Subscriber),
        (status = 409, description = "Email already subscribed"),
        (status = 429)
    )
)]
pub async fn subscribe(
    data: web::Data<AppState>,
    body: web::Json<NewSubscriber>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_subscribe(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let email = body.into_inner().email.trim().to_lowercase();
    require_email(&email)?;
    let subscriber = data
        .repo
        .subscribe(CreateSubscriber {
            email,
            token: Uuid::new_v4().to_string(),
        })
        .await?;
    Ok(HttpResponse::Created().json(subscriber))
}

/// Idempotent: repeating the call leaves the original unsubscription
/// timestamp in place.
#[utoipa::path(
    post,
    path = "/api/v1/newsletter/unsubscribe/{token}",
    responses((status = 200, body = Subscriber), (status = 404))
)]
pub async fn unsubscribe(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let subscriber = data.repo.unsubscribe_by_token(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subscriber))
}

pub async fn list_subscribers(
    auth: Auth,
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let include_unsubscribed = wants(&req, "include_unsubscribed=1");
    let subscribers = data.repo.list_subscribers(include_unsubscribed).await?;
    Ok(HttpResponse::Ok().json(subscribers))
}
