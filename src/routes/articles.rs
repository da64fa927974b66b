use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::{Auth, Role};
use crate::error::ApiError;
use crate::models::*;
use crate::policy::{can_delete, can_edit};
use crate::slug::ARTICLE_SLUG_MAX;

use super::{can_view_hidden, ensure_admin, is_admin, resolve_slug, require_len, wants, AppState};

/// Public view: published, unblocked articles, newest first.
/// `?include_hidden=1` (admin) lists everything; `?mine=1` lists the
/// caller's own articles regardless of status.
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    responses((status = 200, body = [Article]))
)]
pub async fn list_articles(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    if wants(&req, "mine=1") {
        let actor = auth.as_ref().ok_or(ApiError::Forbidden)?.actor();
        let articles = data.repo.list_articles_by_author(actor.id).await?;
        return Ok(HttpResponse::Ok().json(articles));
    }
    let include_hidden = wants(&req, "include_hidden=1") && is_admin(&auth);
    let articles = data.repo.list_articles(include_hidden).await?;
    Ok(HttpResponse::Ok().json(articles))
}

#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    responses(
        (status = 200, body = Article),
        (status = 404, description = "Unknown, blocked or unpublished article")
    )
)]
pub async fn get_article(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let article = data.repo.get_article(path.into_inner()).await?;
    let publicly_visible = article.status == ArticleStatus::Published && !article.blocked;
    if !publicly_visible && !can_view_hidden(&auth, article.author_id) {
        return Err(ApiError::NotFound);
    }
    if publicly_visible {
        // Counting is best effort; a failed bump never fails the read.
        let _ = data.repo.bump_article_views(article.id).await;
    }
    Ok(HttpResponse::Ok().json(article))
}

#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body = NewArticle,
    responses(
        (status = 201, body = Article),
        (status = 403, description = "Caller is not an author or admin"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_article(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewArticle>,
) -> Result<HttpResponse, ApiError> {
    let actor = auth.actor();
    if !matches!(actor.role, Role::Author | Role::Admin) {
        return Err(ApiError::Forbidden);
    }
    let new = body.into_inner();
    require_len("title", &new.title, 3)?;
    require_len("content", &new.content, 1)?;
    let slug = resolve_slug(new.slug, &new.title, ARTICLE_SLUG_MAX)?;

    data.repo
        .upsert_user(actor.id, &auth.0.name, actor.role)
        .await?;
    let article = data
        .repo
        .create_article(CreateArticle {
            author_id: actor.id,
            title: new.title,
            slug,
            content: new.content,
            status: new.status.unwrap_or(ArticleStatus::Draft),
        })
        .await?;
    Ok(HttpResponse::Created().json(article))
}

#[utoipa::path(
    patch,
    path = "/api/v1/articles/{id}",
    request_body = UpdateArticle,
    responses(
        (status = 200, body = Article),
        (status = 403, description = "Caller may not edit this article")
    )
)]
pub async fn update_article(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<UpdateArticle>,
) -> Result<HttpResponse, ApiError> {
    let article = data.repo.get_article(path.into_inner()).await?;
    if !can_edit(&auth.actor(), &article) {
        return Err(ApiError::Forbidden);
    }
    let mut upd = body.into_inner();
    if let Some(title) = &upd.title {
        require_len("title", title, 3)?;
    }
    if let Some(content) = &upd.content {
        require_len("content", content, 1)?;
    }
    // A supplied slug gets the same length guard as on create; an empty
    // one asks for re-derivation from the effective title.
    if let Some(slug) = upd.slug.take() {
        let source = upd.title.as_deref().unwrap_or(&article.title);
        upd.slug = Some(resolve_slug(Some(slug), source, ARTICLE_SLUG_MAX)?);
    }
    let article = data.repo.update_article(article.id, upd).await?;
    Ok(HttpResponse::Ok().json(article))
}

#[utoipa::path(
    delete,
    path = "/api/v1/articles/{id}",
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_article(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let article = data.repo.get_article(path.into_inner()).await?;
    if !can_delete(&auth.actor(), &article) {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_article(article.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn block_article(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<BlockRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let article = data
        .repo
        .set_article_block(
            path.into_inner(),
            true,
            body.into_inner().reason,
            Some(auth.0.sub),
        )
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn unblock_article(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let article = data
        .repo
        .set_article_block(path.into_inner(), false, None, None)
        .await?;
    Ok(HttpResponse::Ok().json(article))
}
