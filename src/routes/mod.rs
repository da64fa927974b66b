use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::{Actor, Auth, Role};
use crate::error::ApiError;
use crate::models::Id;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;
use crate::slug::slugify;

pub mod articles;
pub mod comments;
pub mod contact;
pub mod forum;
pub mod newsletter;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub limits: RateLimiterFacade,
}

macro_rules! ensure_admin {
    ($auth:expr) => {
        if $auth.0.role != crate::auth::Role::Admin {
            return Err(crate::error::ApiError::Forbidden);
        }
    };
}
pub(crate) use ensure_admin;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Articles
            .service(
                web::resource("/articles")
                    .route(web::get().to(articles::list_articles))
                    .route(web::post().to(articles::create_article)),
            )
            .service(
                web::resource("/articles/{id}")
                    .route(web::get().to(articles::get_article))
                    .route(web::patch().to(articles::update_article))
                    .route(web::delete().to(articles::delete_article)),
            )
            .service(
                web::resource("/articles/{id}/comments")
                    .route(web::get().to(comments::list_article_comments)),
            )
            .service(web::resource("/comments").route(web::post().to(comments::create_comment)))
            .service(
                web::resource("/comments/{id}")
                    .route(web::delete().to(comments::delete_comment)),
            )
            .service(
                web::resource("/comments/{id}/report")
                    .route(web::post().to(comments::report_comment)),
            )
            // Forum
            .service(
                web::resource("/forum/categories")
                    .route(web::get().to(forum::list_categories))
                    .route(web::post().to(forum::create_category)),
            )
            .service(
                web::resource("/forum/categories/{id}")
                    .route(web::patch().to(forum::update_category))
                    .route(web::delete().to(forum::delete_category)),
            )
            .service(
                web::resource("/forum/categories/{id}/threads")
                    .route(web::get().to(forum::list_threads)),
            )
            .service(
                web::resource("/forum/threads").route(web::post().to(forum::create_thread)),
            )
            .service(
                web::resource("/forum/threads/{id}")
                    .route(web::get().to(forum::get_thread))
                    .route(web::patch().to(forum::update_thread))
                    .route(web::delete().to(forum::delete_thread)),
            )
            .service(
                web::resource("/forum/threads/{id}/comments")
                    .route(web::get().to(forum::list_thread_comments)),
            )
            .service(
                web::resource("/forum/comments")
                    .route(web::post().to(forum::create_forum_comment)),
            )
            .service(
                web::resource("/forum/comments/{id}")
                    .route(web::delete().to(forum::delete_forum_comment)),
            )
            // Newsletter + contact
            .service(
                web::resource("/newsletter/subscriptions")
                    .route(web::post().to(newsletter::subscribe)),
            )
            .service(
                web::resource("/newsletter/unsubscribe/{token}")
                    .route(web::post().to(newsletter::unsubscribe)),
            )
            .service(web::resource("/contact").route(web::post().to(contact::submit_message)))
            // Session info
            .service(web::resource("/auth/me").route(web::get().to(auth_me)))
            // Admin moderation endpoints
            .service(
                web::resource("/admin/articles/{id}/block")
                    .route(web::post().to(articles::block_article)),
            )
            .service(
                web::resource("/admin/articles/{id}/unblock")
                    .route(web::post().to(articles::unblock_article)),
            )
            .service(
                web::resource("/admin/comments/{id}/clear-report")
                    .route(web::post().to(comments::clear_comment_report)),
            )
            .service(
                web::resource("/admin/forum/categories/{id}/block")
                    .route(web::post().to(forum::block_category)),
            )
            .service(
                web::resource("/admin/forum/categories/{id}/unblock")
                    .route(web::post().to(forum::unblock_category)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/block")
                    .route(web::post().to(forum::block_thread)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/unblock")
                    .route(web::post().to(forum::unblock_thread)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/pin")
                    .route(web::post().to(forum::pin_thread)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/unpin")
                    .route(web::post().to(forum::unpin_thread)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/lock")
                    .route(web::post().to(forum::lock_thread)),
            )
            .service(
                web::resource("/admin/forum/threads/{id}/unlock")
                    .route(web::post().to(forum::unlock_thread)),
            )
            .service(
                web::resource("/admin/forum/comments/{id}/block")
                    .route(web::post().to(forum::block_forum_comment)),
            )
            .service(
                web::resource("/admin/forum/comments/{id}/unblock")
                    .route(web::post().to(forum::unblock_forum_comment)),
            )
            .service(
                web::resource("/admin/forum/bans")
                    .route(web::get().to(forum::list_bans))
                    .route(web::post().to(forum::ban_user)),
            )
            .service(
                web::resource("/admin/forum/bans/{user_id}")
                    .route(web::delete().to(forum::lift_ban)),
            )
            .service(
                web::resource("/admin/newsletter/subscribers")
                    .route(web::get().to(newsletter::list_subscribers)),
            )
            .service(
                web::resource("/admin/contact")
                    .route(web::get().to(contact::list_messages)),
            )
            .service(
                web::resource("/admin/contact/{id}")
                    .route(web::patch().to(contact::update_status))
                    .route(web::delete().to(contact::delete_message)),
            )
            .service(web::resource("/admin/users/{id}").route(web::delete().to(delete_user))),
    );
}

// ---------------- shared helpers ----------------

pub(crate) fn viewer(auth: &Option<Auth>) -> Option<Actor> {
    auth.as_ref().map(|a| a.actor())
}

pub(crate) fn is_admin(auth: &Option<Auth>) -> bool {
    matches!(viewer(auth), Some(actor) if actor.role == Role::Admin)
}

/// Blocked and non-published rows stay readable to their owner and to admins.
pub(crate) fn can_view_hidden(auth: &Option<Auth>, owner: Id) -> bool {
    match viewer(auth) {
        Some(actor) => actor.role == Role::Admin || actor.id == owner,
        None => false,
    }
}

/// True when the query string carries `flag` as a whole `key=value` pair.
pub(crate) fn wants(req: &HttpRequest, flag: &str) -> bool {
    req.query_string().split('&').any(|pair| pair == flag)
}

pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub(crate) fn require_len(field: &str, value: &str, min: usize) -> Result<(), ApiError> {
    if value.trim().chars().count() < min {
        return Err(ApiError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    let valid = trimmed.len() >= 3
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@');
    if !valid {
        return Err(ApiError::Validation("invalid email address".into()));
    }
    Ok(())
}

/// Use the caller's slug when supplied; otherwise derive one from the title.
/// An explicitly empty slug also re-derives (clearing the field on update).
pub(crate) fn resolve_slug(
    given: Option<String>,
    source: &str,
    max_len: usize,
) -> Result<String, ApiError> {
    let slug = match given {
        Some(slug) if !slug.trim().is_empty() => slug,
        _ => slugify(source, max_len),
    };
    if slug.is_empty() {
        return Err(ApiError::Validation(
            "could not derive a slug from the title".into(),
        ));
    }
    if slug.len() > max_len {
        return Err(ApiError::Validation(format!(
            "slug exceeds {max_len} characters"
        )));
    }
    Ok(slug)
}

#[derive(serde::Serialize)]
struct MeResponse {
    id: Id,
    name: String,
    role: String,
}

/// Echo the validated claims back to the client.
pub async fn auth_me(auth: Auth) -> Result<HttpResponse, ApiError> {
    let me = MeResponse {
        id: auth.0.sub,
        name: auth.0.name.clone(),
        role: auth.0.role.as_str().to_string(),
    };
    Ok(HttpResponse::Ok().json(me))
}

/// Hard user removal. Owned content cascades; moderation audit references
/// (`blocked_by`, `reported_by`) null out instead of deleting the rows.
pub async fn delete_user(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    data.repo.delete_user(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
