//! Postgres repository backend. Runtime-bound queries only; the schema and
//! its cascade rules live in `migrations/`.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::*;
use crate::auth::Role;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ARTICLE_COLS: &str = "id, author_id, title, slug, content, status, blocked, \
     blocked_reason, blocked_by, blocked_at, view_count, created_at, updated_at";
const COMMENT_COLS: &str = "id, article_id, author_id, content, parent_id, reported, \
     report_reason, reported_by, reported_at, created_at";
const CATEGORY_COLS: &str = "id, user_id, name, slug, description, is_blocked, \
     blocked_reason, blocked_by, blocked_at, created_at";
const THREAD_COLS: &str = "id, category_id, user_id, title, slug, content, is_blocked, \
     is_pinned, is_locked, view_count, last_activity_at, created_at";
const FORUM_COMMENT_COLS: &str =
    "id, thread_id, user_id, content, parent_comment_id, is_blocked, created_at";
const BAN_COLS: &str = "id, user_id, reason, banned_by, banned_at, expires_at";
const SUBSCRIBER_COLS: &str = "id, email, token, status, subscribed_at, unsubscribed_at";
const CONTACT_COLS: &str = "id, name, email, subject, message, status, created_at";

#[derive(Clone)]
pub struct PgRepo {
    pool: Pool<Postgres>,
}

impl PgRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_err(e: sqlx::Error) -> RepoError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return RepoError::NotFound;
    }
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            // unique_violation: slug/email/token/ban collisions
            Some("23505") => return RepoError::Conflict,
            // foreign_key_violation: referenced row is gone
            Some("23503") => return RepoError::NotFound,
            _ => {}
        }
    }
    RepoError::Internal(e.to_string())
}

fn affected(result: sqlx::postgres::PgQueryResult) -> RepoResult<()> {
    if result.rows_affected() == 0 {
        Err(RepoError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepo for PgRepo {
    async fn upsert_user(&self, id: Id, name: &str, role: Role) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, role) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, role = EXCLUDED.role",
        )
        .bind(id)
        .bind(name)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }

    async fn delete_user(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }
}

#[async_trait]
impl ArticleRepo for PgRepo {
    async fn list_articles(&self, include_hidden: bool) -> RepoResult<Vec<Article>> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLS} FROM articles \
             WHERE (status = 'published' AND NOT blocked) OR $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_articles_by_author(&self, author_id: Id) -> RepoResult<Vec<Article>> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLS} FROM articles WHERE author_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_article(&self, id: Id) -> RepoResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_article(&self, new: CreateArticle) -> RepoResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (author_id, title, slug, content, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ARTICLE_COLS}"
        ))
        .bind(new.author_id)
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.content)
        .bind(new.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update_article(&self, id: Id, upd: UpdateArticle) -> RepoResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                content = COALESCE($4, content), \
                status = COALESCE($5, status), \
                updated_at = now() \
             WHERE id = $1 RETURNING {ARTICLE_COLS}"
        ))
        .bind(id)
        .bind(upd.title.as_deref())
        .bind(upd.slug.as_deref())
        .bind(upd.content.as_deref())
        .bind(upd.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_article(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }

    async fn set_article_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET \
                blocked = $2, \
                blocked_reason = CASE WHEN $2 THEN $3 ELSE NULL END, \
                blocked_by = CASE WHEN $2 THEN $4 ELSE NULL END, \
                blocked_at = CASE WHEN $2 THEN now() ELSE NULL END \
             WHERE id = $1 RETURNING {ARTICLE_COLS}"
        ))
        .bind(id)
        .bind(blocked)
        .bind(reason.as_deref())
        .bind(moderator)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn bump_article_views(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }
}

#[async_trait]
impl CommentRepo for PgRepo {
    async fn list_comments(&self, article_id: Id) -> RepoResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLS} FROM comments WHERE article_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_comment(&self, id: Id) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_comment(&self, new: CreateComment) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (article_id, author_id, content, parent_id) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLS}"
        ))
        .bind(new.article_id)
        .bind(new.author_id)
        .bind(&new.content)
        .bind(new.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn report_comment(
        &self,
        id: Id,
        reason: Option<String>,
        reporter: Option<Id>,
    ) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET reported = TRUE, report_reason = $2, \
                reported_by = $3, reported_at = now() \
             WHERE id = $1 RETURNING {COMMENT_COLS}"
        ))
        .bind(id)
        .bind(reason.as_deref())
        .bind(reporter)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn clear_comment_report(&self, id: Id) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET reported = FALSE, report_reason = NULL, \
                reported_by = NULL, reported_at = NULL \
             WHERE id = $1 RETURNING {COMMENT_COLS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_comment(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }
}

#[async_trait]
impl ForumRepo for PgRepo {
    async fn list_categories(&self, include_hidden: bool) -> RepoResult<Vec<ForumCategory>> {
        sqlx::query_as::<_, ForumCategory>(&format!(
            "SELECT {CATEGORY_COLS} FROM forum_categories \
             WHERE NOT is_blocked OR $1 ORDER BY name ASC, id ASC"
        ))
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_category(&self, id: Id) -> RepoResult<ForumCategory> {
        sqlx::query_as::<_, ForumCategory>(&format!(
            "SELECT {CATEGORY_COLS} FROM forum_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_category(&self, new: CreateForumCategory) -> RepoResult<ForumCategory> {
        sqlx::query_as::<_, ForumCategory>(&format!(
            "INSERT INTO forum_categories (user_id, name, slug, description) \
             VALUES ($1, $2, $3, $4) RETURNING {CATEGORY_COLS}"
        ))
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update_category(
        &self,
        id: Id,
        upd: UpdateForumCategory,
    ) -> RepoResult<ForumCategory> {
        sqlx::query_as::<_, ForumCategory>(&format!(
            "UPDATE forum_categories SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description) \
             WHERE id = $1 RETURNING {CATEGORY_COLS}"
        ))
        .bind(id)
        .bind(upd.name.as_deref())
        .bind(upd.slug.as_deref())
        .bind(upd.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_category(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM forum_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }

    async fn set_category_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<ForumCategory> {
        sqlx::query_as::<_, ForumCategory>(&format!(
            "UPDATE forum_categories SET \
                is_blocked = $2, \
                blocked_reason = CASE WHEN $2 THEN $3 ELSE NULL END, \
                blocked_by = CASE WHEN $2 THEN $4 ELSE NULL END, \
                blocked_at = CASE WHEN $2 THEN now() ELSE NULL END \
             WHERE id = $1 RETURNING {CATEGORY_COLS}"
        ))
        .bind(id)
        .bind(blocked)
        .bind(reason.as_deref())
        .bind(moderator)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_threads(
        &self,
        category_id: Id,
        include_hidden: bool,
    ) -> RepoResult<Vec<ForumThread>> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "SELECT {THREAD_COLS} FROM forum_threads \
             WHERE category_id = $1 AND (NOT is_blocked OR $2) \
             ORDER BY is_pinned DESC, last_activity_at DESC, id DESC"
        ))
        .bind(category_id)
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_thread(&self, id: Id) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "SELECT {THREAD_COLS} FROM forum_threads WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_thread(&self, new: CreateForumThread) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "INSERT INTO forum_threads (category_id, user_id, title, slug, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {THREAD_COLS}"
        ))
        .bind(new.category_id)
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update_thread(&self, id: Id, upd: UpdateForumThread) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "UPDATE forum_threads SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                content = COALESCE($4, content) \
             WHERE id = $1 RETURNING {THREAD_COLS}"
        ))
        .bind(id)
        .bind(upd.title.as_deref())
        .bind(upd.slug.as_deref())
        .bind(upd.content.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_thread(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM forum_threads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }

    async fn set_thread_block(&self, id: Id, blocked: bool) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "UPDATE forum_threads SET is_blocked = $2 WHERE id = $1 RETURNING {THREAD_COLS}"
        ))
        .bind(id)
        .bind(blocked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn set_thread_pinned(&self, id: Id, pinned: bool) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "UPDATE forum_threads SET is_pinned = $2 WHERE id = $1 RETURNING {THREAD_COLS}"
        ))
        .bind(id)
        .bind(pinned)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn set_thread_locked(&self, id: Id, locked: bool) -> RepoResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(&format!(
            "UPDATE forum_threads SET is_locked = $2 WHERE id = $1 RETURNING {THREAD_COLS}"
        ))
        .bind(id)
        .bind(locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn bump_thread_views(&self, id: Id) -> RepoResult<()> {
        let res =
            sqlx::query("UPDATE forum_threads SET view_count = view_count + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_err)?;
        affected(res)
    }

    async fn list_thread_comments(
        &self,
        thread_id: Id,
        include_hidden: bool,
    ) -> RepoResult<Vec<ForumComment>> {
        sqlx::query_as::<_, ForumComment>(&format!(
            "SELECT {FORUM_COMMENT_COLS} FROM forum_comments \
             WHERE thread_id = $1 AND (NOT is_blocked OR $2) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(thread_id)
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_forum_comment(&self, id: Id) -> RepoResult<ForumComment> {
        sqlx::query_as::<_, ForumComment>(&format!(
            "SELECT {FORUM_COMMENT_COLS} FROM forum_comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_forum_comment(&self, new: CreateForumComment) -> RepoResult<ForumComment> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let comment = sqlx::query_as::<_, ForumComment>(&format!(
            "INSERT INTO forum_comments (thread_id, user_id, content, parent_comment_id) \
             VALUES ($1, $2, $3, $4) RETURNING {FORUM_COMMENT_COLS}"
        ))
        .bind(new.thread_id)
        .bind(new.user_id)
        .bind(&new.content)
        .bind(new.parent_comment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err)?;
        sqlx::query("UPDATE forum_threads SET last_activity_at = now() WHERE id = $1")
            .bind(new.thread_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        tx.commit().await.map_err(map_err)?;
        Ok(comment)
    }

    async fn set_forum_comment_block(&self, id: Id, blocked: bool) -> RepoResult<ForumComment> {
        sqlx::query_as::<_, ForumComment>(&format!(
            "UPDATE forum_comments SET is_blocked = $2 WHERE id = $1 \
             RETURNING {FORUM_COMMENT_COLS}"
        ))
        .bind(id)
        .bind(blocked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_forum_comment(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM forum_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }
}

#[async_trait]
impl BanRepo for PgRepo {
    async fn ban_user(
        &self,
        new: NewForumBan,
        banned_by: Option<Id>,
    ) -> RepoResult<UserForumBan> {
        // Single-row-per-user semantics: superseded in place, no history.
        sqlx::query_as::<_, UserForumBan>(&format!(
            "INSERT INTO user_forum_bans (user_id, reason, banned_by, expires_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                reason = EXCLUDED.reason, \
                banned_by = EXCLUDED.banned_by, \
                banned_at = now(), \
                expires_at = EXCLUDED.expires_at \
             RETURNING {BAN_COLS}"
        ))
        .bind(new.user_id)
        .bind(&new.reason)
        .bind(banned_by)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn lift_ban(&self, user_id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM user_forum_bans WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }

    async fn find_ban(&self, user_id: Id) -> RepoResult<Option<UserForumBan>> {
        sqlx::query_as::<_, UserForumBan>(&format!(
            "SELECT {BAN_COLS} FROM user_forum_bans WHERE user_id = $1 \
             ORDER BY banned_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_bans(&self) -> RepoResult<Vec<UserForumBan>> {
        sqlx::query_as::<_, UserForumBan>(&format!(
            "SELECT {BAN_COLS} FROM user_forum_bans ORDER BY banned_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl NewsletterRepo for PgRepo {
    async fn subscribe(&self, new: CreateSubscriber) -> RepoResult<Subscriber> {
        // Reactivates an unsubscribed row; an active duplicate matches no row
        // and surfaces as Conflict.
        let row = sqlx::query_as::<_, Subscriber>(&format!(
            "INSERT INTO newsletter_subscribers (email, token) VALUES ($1, $2) \
             ON CONFLICT (email) DO UPDATE SET \
                status = 'active', subscribed_at = now(), unsubscribed_at = NULL \
             WHERE newsletter_subscribers.status = 'unsubscribed' \
             RETURNING {SUBSCRIBER_COLS}"
        ))
        .bind(&new.email)
        .bind(&new.token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.ok_or(RepoError::Conflict)
    }

    async fn unsubscribe_by_token(&self, token: &str) -> RepoResult<Subscriber> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "UPDATE newsletter_subscribers SET \
                status = 'unsubscribed', \
                unsubscribed_at = COALESCE(unsubscribed_at, now()) \
             WHERE token = $1 RETURNING {SUBSCRIBER_COLS}"
        ))
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_subscribers(&self, include_unsubscribed: bool) -> RepoResult<Vec<Subscriber>> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLS} FROM newsletter_subscribers \
             WHERE status = 'active' OR $1 ORDER BY id ASC"
        ))
        .bind(include_unsubscribed)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl ContactRepo for PgRepo {
    async fn create_contact_message(
        &self,
        new: NewContactMessage,
    ) -> RepoResult<ContactMessage> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "INSERT INTO contact_messages (name, email, subject, message) \
             VALUES ($1, $2, $3, $4) RETURNING {CONTACT_COLS}"
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.subject.as_deref())
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_contact_messages(
        &self,
        status: Option<ContactStatus>,
    ) -> RepoResult<Vec<ContactMessage>> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {CONTACT_COLS} FROM contact_messages \
             WHERE $1::text IS NULL OR status = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn set_contact_status(
        &self,
        id: Id,
        status: ContactStatus,
    ) -> RepoResult<ContactMessage> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "UPDATE contact_messages SET status = $2 WHERE id = $1 RETURNING {CONTACT_COLS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_contact_message(&self, id: Id) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        affected(res)
    }
}
