use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::auth::{Auth, Role};
use crate::error::ApiError;
use crate::models::*;
use crate::policy::{can_delete, can_edit};
use crate::slug::{CATEGORY_SLUG_MAX, THREAD_SLUG_MAX};

use super::{
    can_view_hidden, client_ip, ensure_admin, is_admin, require_len, resolve_slug, wants, AppState,
};

async fn visible_category(
    data: &AppState,
    auth: &Option<Auth>,
    id: Id,
) -> Result<ForumCategory, ApiError> {
    let category = data.repo.get_category(id).await?;
    if category.is_blocked && !can_view_hidden(auth, category.user_id) {
        return Err(ApiError::NotFound);
    }
    Ok(category)
}

async fn visible_thread(
    data: &AppState,
    auth: &Option<Auth>,
    id: Id,
) -> Result<ForumThread, ApiError> {
    let thread = data.repo.get_thread(id).await?;
    if thread.is_blocked && !can_view_hidden(auth, thread.user_id) {
        return Err(ApiError::NotFound);
    }
    Ok(thread)
}

/// Reject forum writes from banned users before touching any content.
async fn reject_banned(data: &AppState, user_id: Id) -> Result<(), ApiError> {
    if data.repo.is_banned(user_id, Utc::now()).await? {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

// ---------------- categories ----------------

#[utoipa::path(
    get,
    path = "/api/v1/forum/categories",
    responses((status = 200, body = [ForumCategory]))
)]
pub async fn list_categories(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let include_hidden = wants(&req, "include_hidden=1") && is_admin(&auth);
    let categories = data.repo.list_categories(include_hidden).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/categories",
    request_body = NewForumCategory,
    responses((status = 201, body = ForumCategory), (status = 403), (status = 409))
)]
pub async fn create_category(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewForumCategory>,
) -> Result<HttpResponse, ApiError> {
    let actor = auth.actor();
    if !matches!(actor.role, Role::Author | Role::Admin) {
        return Err(ApiError::Forbidden);
    }
    let new = body.into_inner();
    require_len("name", &new.name, 2)?;
    let slug = resolve_slug(new.slug, &new.name, CATEGORY_SLUG_MAX)?;

    data.repo
        .upsert_user(actor.id, &auth.0.name, actor.role)
        .await?;
    let category = data
        .repo
        .create_category(CreateForumCategory {
            user_id: actor.id,
            name: new.name,
            slug,
            description: new.description,
        })
        .await?;
    Ok(HttpResponse::Created().json(category))
}

pub async fn update_category(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<UpdateForumCategory>,
) -> Result<HttpResponse, ApiError> {
    let category = data.repo.get_category(path.into_inner()).await?;
    if !can_edit(&auth.actor(), &category) {
        return Err(ApiError::Forbidden);
    }
    let mut upd = body.into_inner();
    if let Some(name) = &upd.name {
        require_len("name", name, 2)?;
    }
    if let Some(slug) = upd.slug.take() {
        let source = upd.name.as_deref().unwrap_or(&category.name);
        upd.slug = Some(resolve_slug(Some(slug), source, CATEGORY_SLUG_MAX)?);
    }
    let category = data.repo.update_category(category.id, upd).await?;
    Ok(HttpResponse::Ok().json(category))
}

/// Removing a category removes every thread and comment under it.
pub async fn delete_category(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let category = data.repo.get_category(path.into_inner()).await?;
    if !can_delete(&auth.actor(), &category) {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_category(category.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn block_category(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<BlockRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let category = data
        .repo
        .set_category_block(
            path.into_inner(),
            true,
            body.into_inner().reason,
            Some(auth.0.sub),
        )
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

pub async fn unblock_category(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let category = data
        .repo
        .set_category_block(path.into_inner(), false, None, None)
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

// ---------------- threads ----------------

/// Pinned threads first, then by most recent activity.
#[utoipa::path(
    get,
    path = "/api/v1/forum/categories/{id}/threads",
    responses((status = 200, body = [ForumThread]), (status = 404))
)]
pub async fn list_threads(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let category = visible_category(&data, &auth, path.into_inner()).await?;
    let include_hidden = wants(&req, "include_hidden=1") && is_admin(&auth);
    let threads = data.repo.list_threads(category.id, include_hidden).await?;
    Ok(HttpResponse::Ok().json(threads))
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/threads",
    request_body = NewForumThread,
    responses(
        (status = 201, body = ForumThread),
        (status = 403, description = "Caller is banned from the forum"),
        (status = 429)
    )
)]
pub async fn create_thread(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewForumThread>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = auth.actor();
    reject_banned(&data, actor.id).await?;
    if !data.limits.allow_thread(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = body.into_inner();
    require_len("title", &new.title, 3)?;
    require_len("content", &new.content, 1)?;

    let wrapped = Some(Auth(auth.0.clone()));
    let category = visible_category(&data, &wrapped, new.category_id).await?;
    if category.is_blocked {
        // Owners and admins can still see a blocked category but nobody
        // posts into one.
        return Err(ApiError::Forbidden);
    }
    let slug = resolve_slug(new.slug, &new.title, THREAD_SLUG_MAX)?;

    data.repo
        .upsert_user(actor.id, &auth.0.name, actor.role)
        .await?;
    let thread = data
        .repo
        .create_thread(CreateForumThread {
            category_id: category.id,
            user_id: actor.id,
            title: new.title,
            slug,
            content: new.content,
        })
        .await?;
    Ok(HttpResponse::Created().json(thread))
}

#[utoipa::path(
    get,
    path = "/api/v1/forum/threads/{id}",
    responses((status = 200, body = ForumThread), (status = 404))
)]
pub async fn get_thread(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let thread = visible_thread(&data, &auth, path.into_inner()).await?;
    if !thread.is_blocked {
        let _ = data.repo.bump_thread_views(thread.id).await;
    }
    Ok(HttpResponse::Ok().json(thread))
}

/// Locked threads refuse edits, even from their owner. Admins bypass.
pub async fn update_thread(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<UpdateForumThread>,
) -> Result<HttpResponse, ApiError> {
    let thread = data.repo.get_thread(path.into_inner()).await?;
    if !can_edit(&auth.actor(), &thread) {
        return Err(ApiError::Forbidden);
    }
    let mut upd = body.into_inner();
    if let Some(title) = &upd.title {
        require_len("title", title, 3)?;
    }
    if let Some(slug) = upd.slug.take() {
        let source = upd.title.as_deref().unwrap_or(&thread.title);
        upd.slug = Some(resolve_slug(Some(slug), source, THREAD_SLUG_MAX)?);
    }
    let thread = data.repo.update_thread(thread.id, upd).await?;
    Ok(HttpResponse::Ok().json(thread))
}

/// Deletion ignores the lock flag; owners may remove their locked threads.
pub async fn delete_thread(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let thread = data.repo.get_thread(path.into_inner()).await?;
    if !can_delete(&auth.actor(), &thread) {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_thread(thread.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

macro_rules! thread_flag_handler {
    ($name:ident, $setter:ident, $value:expr) => {
        pub async fn $name(
            auth: Auth,
            data: web::Data<AppState>,
            path: web::Path<Id>,
        ) -> Result<HttpResponse, ApiError> {
            ensure_admin!(auth);
            let thread = data.repo.$setter(path.into_inner(), $value).await?;
            Ok(HttpResponse::Ok().json(thread))
        }
    };
}

thread_flag_handler!(block_thread, set_thread_block, true);
thread_flag_handler!(unblock_thread, set_thread_block, false);
thread_flag_handler!(pin_thread, set_thread_pinned, true);
thread_flag_handler!(unpin_thread, set_thread_pinned, false);
thread_flag_handler!(lock_thread, set_thread_locked, true);
thread_flag_handler!(unlock_thread, set_thread_locked, false);

// ---------------- thread comments ----------------

#[utoipa::path(
    get,
    path = "/api/v1/forum/threads/{id}/comments",
    responses((status = 200, body = [ForumComment]), (status = 404))
)]
pub async fn list_thread_comments(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let thread = visible_thread(&data, &auth, path.into_inner()).await?;
    let include_hidden = wants(&req, "include_hidden=1") && is_admin(&auth);
    let comments = data
        .repo
        .list_thread_comments(thread.id, include_hidden)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/comments",
    request_body = NewForumComment,
    responses(
        (status = 201, body = ForumComment),
        (status = 403, description = "Banned caller or locked thread"),
        (status = 429)
    )
)]
pub async fn create_forum_comment(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewForumComment>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = auth.actor();
    reject_banned(&data, actor.id).await?;
    if !data.limits.allow_comment(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = body.into_inner();
    require_len("content", &new.content, 1)?;

    let wrapped = Some(Auth(auth.0.clone()));
    let thread = visible_thread(&data, &wrapped, new.thread_id).await?;
    if thread.is_blocked {
        return Err(ApiError::Forbidden);
    }
    if thread.is_locked && actor.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    if let Some(parent_id) = new.parent_comment_id {
        let parent = data
            .repo
            .get_forum_comment(parent_id)
            .await
            .map_err(|_| ApiError::Validation("parent comment not found".into()))?;
        if parent.thread_id != thread.id {
            return Err(ApiError::Validation(
                "parent comment belongs to a different thread".into(),
            ));
        }
    }

    data.repo
        .upsert_user(actor.id, &auth.0.name, actor.role)
        .await?;
    let comment = data
        .repo
        .create_forum_comment(CreateForumComment {
            thread_id: thread.id,
            user_id: actor.id,
            content: new.content,
            parent_comment_id: new.parent_comment_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn delete_forum_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let comment = data.repo.get_forum_comment(path.into_inner()).await?;
    if !can_delete(&auth.actor(), &comment) {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_forum_comment(comment.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn block_forum_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let comment = data
        .repo
        .set_forum_comment_block(path.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn unblock_forum_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let comment = data
        .repo
        .set_forum_comment_block(path.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

// ---------------- bans ----------------

/// Ban or re-ban a user. A second ban for the same user supersedes the
/// first in place, so the registry holds one row per user.
#[utoipa::path(
    post,
    path = "/api/v1/admin/forum/bans",
    request_body = NewForumBan,
    responses((status = 201, body = UserForumBan), (status = 403), (status = 404))
)]
pub async fn ban_user(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewForumBan>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let new = body.into_inner();
    require_len("reason", &new.reason, 1)?;
    if new.user_id == auth.0.sub {
        return Err(ApiError::Validation("cannot ban yourself".into()));
    }
    let ban = data.repo.ban_user(new, Some(auth.0.sub)).await?;
    Ok(HttpResponse::Created().json(ban))
}

pub async fn lift_ban(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    data.repo.lift_ban(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_bans(auth: Auth, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let bans = data.repo.list_bans().await?;
    Ok(HttpResponse::Ok().json(bans))
}
