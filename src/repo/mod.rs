use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::Role;
use crate::models::*;

#[cfg(feature = "inmem-store")]
pub mod inmem;
#[cfg(feature = "postgres-store")]
pub mod pg;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("internal: {0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Actors are provisioned just-in-time from JWT claims; user rows exist so
/// the ownership and audit foreign keys have a target.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn upsert_user(&self, id: Id, name: &str, role: Role) -> RepoResult<()>;
    /// Hard delete. Owned content cascades; `blocked_by`/`reported_by`
    /// audit references elsewhere are nulled, not removed.
    async fn delete_user(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait ArticleRepo: Send + Sync {
    /// Public listing excludes drafts, archived and blocked rows unless
    /// `include_hidden` is set (admin listings).
    async fn list_articles(&self, include_hidden: bool) -> RepoResult<Vec<Article>>;
    async fn list_articles_by_author(&self, author_id: Id) -> RepoResult<Vec<Article>>;
    async fn get_article(&self, id: Id) -> RepoResult<Article>;
    async fn create_article(&self, new: CreateArticle) -> RepoResult<Article>;
    async fn update_article(&self, id: Id, upd: UpdateArticle) -> RepoResult<Article>;
    async fn delete_article(&self, id: Id) -> RepoResult<()>;
    async fn set_article_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<Article>;
    /// Single atomic increment; never read-modify-write.
    async fn bump_article_views(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn list_comments(&self, article_id: Id) -> RepoResult<Vec<Comment>>;
    async fn get_comment(&self, id: Id) -> RepoResult<Comment>;
    async fn create_comment(&self, new: CreateComment) -> RepoResult<Comment>;
    async fn report_comment(
        &self,
        id: Id,
        reason: Option<String>,
        reporter: Option<Id>,
    ) -> RepoResult<Comment>;
    async fn clear_comment_report(&self, id: Id) -> RepoResult<Comment>;
    async fn delete_comment(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait ForumRepo: Send + Sync {
    async fn list_categories(&self, include_hidden: bool) -> RepoResult<Vec<ForumCategory>>;
    async fn get_category(&self, id: Id) -> RepoResult<ForumCategory>;
    async fn create_category(&self, new: CreateForumCategory) -> RepoResult<ForumCategory>;
    async fn update_category(&self, id: Id, upd: UpdateForumCategory)
        -> RepoResult<ForumCategory>;
    /// Cascades to the category's threads and their comments.
    async fn delete_category(&self, id: Id) -> RepoResult<()>;
    async fn set_category_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<ForumCategory>;

    /// Pinned threads first, then most recent activity.
    async fn list_threads(&self, category_id: Id, include_hidden: bool)
        -> RepoResult<Vec<ForumThread>>;
    async fn get_thread(&self, id: Id) -> RepoResult<ForumThread>;
    async fn create_thread(&self, new: CreateForumThread) -> RepoResult<ForumThread>;
    async fn update_thread(&self, id: Id, upd: UpdateForumThread) -> RepoResult<ForumThread>;
    async fn delete_thread(&self, id: Id) -> RepoResult<()>;
    async fn set_thread_block(&self, id: Id, blocked: bool) -> RepoResult<ForumThread>;
    async fn set_thread_pinned(&self, id: Id, pinned: bool) -> RepoResult<ForumThread>;
    async fn set_thread_locked(&self, id: Id, locked: bool) -> RepoResult<ForumThread>;
    async fn bump_thread_views(&self, id: Id) -> RepoResult<()>;

    async fn list_thread_comments(
        &self,
        thread_id: Id,
        include_hidden: bool,
    ) -> RepoResult<Vec<ForumComment>>;
    async fn get_forum_comment(&self, id: Id) -> RepoResult<ForumComment>;
    /// Also stamps the thread's `last_activity_at`.
    async fn create_forum_comment(&self, new: CreateForumComment) -> RepoResult<ForumComment>;
    async fn set_forum_comment_block(&self, id: Id, blocked: bool) -> RepoResult<ForumComment>;
    async fn delete_forum_comment(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait BanRepo: Send + Sync {
    /// Upsert: at most one row per user, superseded in place.
    async fn ban_user(&self, new: NewForumBan, banned_by: Option<Id>)
        -> RepoResult<UserForumBan>;
    async fn lift_ban(&self, user_id: Id) -> RepoResult<()>;
    /// Most recently created row, defensively, even though the unique
    /// constraint keeps this to a single row.
    async fn find_ban(&self, user_id: Id) -> RepoResult<Option<UserForumBan>>;
    async fn list_bans(&self) -> RepoResult<Vec<UserForumBan>>;

    async fn is_banned(&self, user_id: Id, now: DateTime<Utc>) -> RepoResult<bool> {
        Ok(self
            .find_ban(user_id)
            .await?
            .map(|ban| ban.is_active_at(now))
            .unwrap_or(false))
    }
}

#[async_trait]
pub trait NewsletterRepo: Send + Sync {
    /// Re-subscribing an unsubscribed email reactivates the existing row;
    /// an already-active email is a conflict.
    async fn subscribe(&self, new: CreateSubscriber) -> RepoResult<Subscriber>;
    async fn unsubscribe_by_token(&self, token: &str) -> RepoResult<Subscriber>;
    async fn list_subscribers(&self, include_unsubscribed: bool) -> RepoResult<Vec<Subscriber>>;
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn create_contact_message(&self, new: NewContactMessage) -> RepoResult<ContactMessage>;
    async fn list_contact_messages(
        &self,
        status: Option<ContactStatus>,
    ) -> RepoResult<Vec<ContactMessage>>;
    async fn set_contact_status(&self, id: Id, status: ContactStatus)
        -> RepoResult<ContactMessage>;
    async fn delete_contact_message(&self, id: Id) -> RepoResult<()>;
}

pub trait Repo:
    UserRepo + ArticleRepo + CommentRepo + ForumRepo + BanRepo + NewsletterRepo + ContactRepo
{
}

impl<T> Repo for T where
    T: UserRepo + ArticleRepo + CommentRepo + ForumRepo + BanRepo + NewsletterRepo + ContactRepo
{
}
