use actix_web::{web, HttpResponse};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::*;
use crate::policy::can_delete;

use super::{can_view_hidden, ensure_admin, require_len, AppState};

async fn visible_article(
    data: &AppState,
    auth: &Option<Auth>,
    article_id: Id,
) -> Result<Article, ApiError> {
    let article = data.repo.get_article(article_id).await?;
    let publicly_visible = article.status == ArticleStatus::Published && !article.blocked;
    if !publicly_visible && !can_view_hidden(auth, article.author_id) {
        return Err(ApiError::NotFound);
    }
    Ok(article)
}

/// Flat list in creation order; clients rebuild the tree from `parent_id`.
#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}/comments",
    responses((status = 200, body = [Comment]), (status = 404))
)]
pub async fn list_article_comments(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let article = visible_article(&data, &auth, path.into_inner()).await?;
    let comments = data.repo.list_comments(article.id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Any authenticated user may comment on a visible article. A reply's
/// parent must exist under the same article.
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = NewComment,
    responses((status = 201, body = Comment), (status = 400), (status = 404))
)]
pub async fn create_comment(
    auth: Auth,
    data: web::Data<AppState>,
    body: web::Json<NewComment>,
) -> Result<HttpResponse, ApiError> {
    let actor = auth.actor();
    let new = body.into_inner();
    require_len("content", &new.content, 1)?;

    let wrapped = Some(Auth(auth.0.clone()));
    let article = visible_article(&data, &wrapped, new.article_id).await?;
    if let Some(parent_id) = new.parent_id {
        let parent = data
            .repo
            .get_comment(parent_id)
            .await
            .map_err(|_| ApiError::Validation("parent comment not found".into()))?;
        if parent.article_id != article.id {
            return Err(ApiError::Validation(
                "parent comment belongs to a different article".into(),
            ));
        }
    }

    data.repo
        .upsert_user(actor.id, &auth.0.name, actor.role)
        .await?;
    let comment = data
        .repo
        .create_comment(CreateComment {
            article_id: article.id,
            author_id: actor.id,
            content: new.content,
            parent_id: new.parent_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Flag a comment for moderator review. The comment stays visible; repeat
/// reports overwrite the previous flag.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/report",
    request_body = ReportRequest,
    responses((status = 200, body = Comment), (status = 404))
)]
pub async fn report_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let comment = data
        .repo
        .report_comment(path.into_inner(), body.into_inner().reason, Some(auth.0.sub))
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn clear_comment_report(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(auth);
    let comment = data.repo.clear_comment_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Deleting a comment takes its descendant replies with it.
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let comment = data.repo.get_comment(path.into_inner()).await?;
    if !can_delete(&auth.actor(), &comment) {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_comment(comment.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
