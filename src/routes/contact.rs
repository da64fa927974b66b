use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::*;

use super::{client_ip, ensure_admin, require_email, require_len, AppState};

/// Public contact form. Messages land in the admin inbox with status `new`.
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = NewContactMessage,
    responses((status = 201, body = ContactMessage), (status = 400), (status = 429))
)]
pub async fn submit_message(
    data: web::Data<AppState>,
    body: web::Json<NewContactMessage>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_contact(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = body.into_inner();
    require_len("name", &new.name, 1)?;
    require_email(&new.email)?;
    require_len("message", &new.message, 1)?;
    let message = data.repo.create_contact_message(new).await?;
    Ok(HttpResponse::Created().json(message))
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<ContactStatus>,
}

pub async fn list_messages(
    auth: Auth,
    data: web::Data<AppState>,
    query: web::Query<ContactListQuery>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let messages = data
        .repo
        .list_contact_messages(query.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn update_status(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<UpdateContactStatus>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let message = data
        .repo
        .set_contact_status(path.into_inner(), body.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

pub async fn delete_message(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    data.repo.delete_contact_message(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
