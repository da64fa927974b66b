use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Id = i64;

/// Raised when a status column holds a value outside its closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown status value: {0}")]
pub struct ParseStatusError(pub String);

macro_rules! status_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseStatusError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError(value)),
                }
            }
        }
    };
}

status_enum!(ArticleStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

status_enum!(ContactStatus {
    New => "new",
    Read => "read",
    Replied => "replied",
    Archived => "archived",
});

status_enum!(SubscriptionStatus {
    Active => "active",
    Unsubscribed => "unsubscribed",
});

// ---------------- Articles ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Article {
    pub id: Id,
    pub author_id: Id,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: ArticleStatus,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub blocked_by: Option<Id>,
    pub blocked_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API payload; slug is derived from the title when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewArticle {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub status: Option<ArticleStatus>,
}

/// Repository input with the slug already resolved by the handler.
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub author_id: Id,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: ArticleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub status: Option<ArticleStatus>,
}

// ---------------- Article comments ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Comment {
    pub id: Id,
    pub article_id: Id,
    pub author_id: Id,
    pub content: String,
    pub parent_id: Option<Id>,
    pub reported: bool,
    pub report_reason: Option<String>,
    pub reported_by: Option<Id>,
    pub reported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewComment {
    pub article_id: Id,
    pub content: String,
    pub parent_id: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub article_id: Id,
    pub author_id: Id,
    pub content: String,
    pub parent_id: Option<Id>,
}

// ---------------- Forum ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ForumCategory {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_blocked: bool,
    pub blocked_reason: Option<String>,
    pub blocked_by: Option<Id>,
    pub blocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewForumCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateForumCategory {
    pub user_id: Id,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateForumCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ForumThread {
    pub id: Id,
    pub category_id: Id,
    pub user_id: Id,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub is_blocked: bool,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub view_count: i64,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewForumThread {
    pub category_id: Id,
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct CreateForumThread {
    pub category_id: Id,
    pub user_id: Id,
    pub title: String,
    pub slug: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateForumThread {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ForumComment {
    pub id: Id,
    pub thread_id: Id,
    pub user_id: Id,
    pub content: String,
    pub parent_comment_id: Option<Id>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewForumComment {
    pub thread_id: Id,
    pub content: String,
    pub parent_comment_id: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct CreateForumComment {
    pub thread_id: Id,
    pub user_id: Id,
    pub content: String,
    pub parent_comment_id: Option<Id>,
}

// ---------------- Forum bans ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct UserForumBan {
    pub id: Id,
    pub user_id: Id,
    pub reason: String,
    pub banned_by: Option<Id>,
    pub banned_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserForumBan {
    /// A null expiry is a permanent ban; otherwise active strictly before expiry.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => expiry > now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewForumBan {
    pub user_id: Id,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
}

// ---------------- Newsletter ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Id,
    pub email: String,
    pub token: String,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewSubscriber {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriber {
    pub email: String,
    pub token: String,
}

// ---------------- Contact inbox ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

// ---------------- Moderation payloads ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateContactStatus {
    pub status: ContactStatus,
}
