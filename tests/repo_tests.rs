#![cfg(feature = "inmem-store")]

use arbor::auth::Role;
use arbor::models::*;
use arbor::repo::inmem::InMemRepo;
use arbor::repo::{
    ArticleRepo, BanRepo, CommentRepo, ContactRepo, ForumRepo, NewsletterRepo, RepoError, UserRepo,
};
use chrono::{Duration, Utc};

async fn seed_author(repo: &InMemRepo, id: i64) {
    repo.upsert_user(id, "author", Role::Author).await.unwrap();
}

fn article_input(author_id: i64, slug: &str) -> CreateArticle {
    CreateArticle {
        author_id,
        title: "A title".into(),
        slug: slug.into(),
        content: "body".into(),
        status: ArticleStatus::Published,
    }
}

#[tokio::test]
async fn article_slug_conflict() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    repo.create_article(article_input(1, "intro")).await.unwrap();
    let err = repo.create_article(article_input(1, "intro")).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict));
}

#[tokio::test]
async fn public_listing_hides_drafts_and_blocked() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    let published = repo.create_article(article_input(1, "pub")).await.unwrap();
    let mut draft = article_input(1, "draft");
    draft.status = ArticleStatus::Draft;
    repo.create_article(draft).await.unwrap();
    let blocked = repo.create_article(article_input(1, "blocked")).await.unwrap();
    repo.set_article_block(blocked.id, true, Some("spam".into()), Some(9))
        .await
        .unwrap();

    let visible = repo.list_articles(false).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, published.id);

    let all = repo.list_articles(true).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn view_bump_increments_by_one() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    let article = repo.create_article(article_input(1, "views")).await.unwrap();
    repo.bump_article_views(article.id).await.unwrap();
    repo.bump_article_views(article.id).await.unwrap();
    assert_eq!(repo.get_article(article.id).await.unwrap().view_count, 2);
}

#[tokio::test]
async fn deleting_comment_removes_descendants() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    let article = repo.create_article(article_input(1, "nested")).await.unwrap();
    let root = repo
        .create_comment(CreateComment {
            article_id: article.id,
            author_id: 1,
            content: "root".into(),
            parent_id: None,
        })
        .await
        .unwrap();
    let child = repo
        .create_comment(CreateComment {
            article_id: article.id,
            author_id: 1,
            content: "child".into(),
            parent_id: Some(root.id),
        })
        .await
        .unwrap();
    repo.create_comment(CreateComment {
        article_id: article.id,
        author_id: 1,
        content: "grandchild".into(),
        parent_id: Some(child.id),
    })
    .await
    .unwrap();
    let sibling = repo
        .create_comment(CreateComment {
            article_id: article.id,
            author_id: 1,
            content: "sibling".into(),
            parent_id: None,
        })
        .await
        .unwrap();

    repo.delete_comment(root.id).await.unwrap();
    let remaining = repo.list_comments(article.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, sibling.id);
}

#[tokio::test]
async fn category_delete_cascades_to_threads_and_comments() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    let category = repo
        .create_category(CreateForumCategory {
            user_id: 1,
            name: "General".into(),
            slug: "general".into(),
            description: None,
        })
        .await
        .unwrap();
    let thread = repo
        .create_thread(CreateForumThread {
            category_id: category.id,
            user_id: 1,
            title: "First thread".into(),
            slug: "first-thread".into(),
            content: "hello".into(),
        })
        .await
        .unwrap();
    let comment = repo
        .create_forum_comment(CreateForumComment {
            thread_id: thread.id,
            user_id: 1,
            content: "reply".into(),
            parent_comment_id: None,
        })
        .await
        .unwrap();

    repo.delete_category(category.id).await.unwrap();
    assert!(matches!(
        repo.get_thread(thread.id).await.unwrap_err(),
        RepoError::NotFound
    ));
    assert!(matches!(
        repo.get_forum_comment(comment.id).await.unwrap_err(),
        RepoError::NotFound
    ));
}

#[tokio::test]
async fn thread_listing_orders_pinned_then_activity() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    let category = repo
        .create_category(CreateForumCategory {
            user_id: 1,
            name: "General".into(),
            slug: "general".into(),
            description: None,
        })
        .await
        .unwrap();
    let older = repo
        .create_thread(CreateForumThread {
            category_id: category.id,
            user_id: 1,
            title: "Older".into(),
            slug: "older".into(),
            content: "a".into(),
        })
        .await
        .unwrap();
    let newer = repo
        .create_thread(CreateForumThread {
            category_id: category.id,
            user_id: 1,
            title: "Newer".into(),
            slug: "newer".into(),
            content: "b".into(),
        })
        .await
        .unwrap();
    // A reply to the older thread bumps it above the newer one.
    repo.create_forum_comment(CreateForumComment {
        thread_id: older.id,
        user_id: 1,
        content: "bump".into(),
        parent_comment_id: None,
    })
    .await
    .unwrap();
    repo.set_thread_pinned(newer.id, true).await.unwrap();

    let threads = repo.list_threads(category.id, false).await.unwrap();
    let ids: Vec<_> = threads.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn ban_upsert_keeps_single_row_per_user() {
    let repo = InMemRepo::new();
    repo.upsert_user(5, "poster", Role::User).await.unwrap();
    let first = repo
        .ban_user(
            NewForumBan {
                user_id: 5,
                reason: "spam".into(),
                expires_at: None,
            },
            Some(1),
        )
        .await
        .unwrap();
    let second = repo
        .ban_user(
            NewForumBan {
                user_id: 5,
                reason: "more spam".into(),
                expires_at: Some(Utc::now() + Duration::days(7)),
            },
            Some(2),
        )
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(repo.list_bans().await.unwrap().len(), 1);
    assert_eq!(
        repo.find_ban(5).await.unwrap().unwrap().reason,
        "more spam"
    );
}

#[tokio::test]
async fn expired_ban_is_inactive() {
    let repo = InMemRepo::new();
    repo.upsert_user(5, "poster", Role::User).await.unwrap();
    repo.ban_user(
        NewForumBan {
            user_id: 5,
            reason: "cooldown".into(),
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        },
        Some(1),
    )
    .await
    .unwrap();
    assert!(!repo.is_banned(5, Utc::now()).await.unwrap());

    repo.ban_user(
        NewForumBan {
            user_id: 5,
            reason: "permanent".into(),
            expires_at: None,
        },
        Some(1),
    )
    .await
    .unwrap();
    assert!(repo.is_banned(5, Utc::now()).await.unwrap());

    repo.lift_ban(5).await.unwrap();
    assert!(!repo.is_banned(5, Utc::now()).await.unwrap());
    assert!(matches!(
        repo.lift_ban(5).await.unwrap_err(),
        RepoError::NotFound
    ));
}

#[tokio::test]
async fn resubscribe_reactivates_unsubscribed_email() {
    let repo = InMemRepo::new();
    let sub = repo
        .subscribe(CreateSubscriber {
            email: "a@example.com".into(),
            token: "tok-1".into(),
        })
        .await
        .unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);

    // Active address conflicts.
    let err = repo
        .subscribe(CreateSubscriber {
            email: "a@example.com".into(),
            token: "tok-2".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict));

    let unsubbed = repo.unsubscribe_by_token(&sub.token).await.unwrap();
    assert_eq!(unsubbed.status, SubscriptionStatus::Unsubscribed);
    let stamp = unsubbed.unsubscribed_at.unwrap();

    // Idempotent: repeating keeps the original timestamp.
    let again = repo.unsubscribe_by_token(&sub.token).await.unwrap();
    assert_eq!(again.unsubscribed_at, Some(stamp));

    let back = repo
        .subscribe(CreateSubscriber {
            email: "a@example.com".into(),
            token: "tok-3".into(),
        })
        .await
        .unwrap();
    assert_eq!(back.id, sub.id);
    assert_eq!(back.status, SubscriptionStatus::Active);
    assert!(back.unsubscribed_at.is_none());
}

#[tokio::test]
async fn contact_status_transitions() {
    let repo = InMemRepo::new();
    let msg = repo
        .create_contact_message(NewContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: Some("Hi".into()),
            message: "Hello there".into(),
        })
        .await
        .unwrap();
    assert_eq!(msg.status, ContactStatus::New);

    let read = repo
        .set_contact_status(msg.id, ContactStatus::Read)
        .await
        .unwrap();
    assert_eq!(read.status, ContactStatus::Read);

    let filtered = repo
        .list_contact_messages(Some(ContactStatus::New))
        .await
        .unwrap();
    assert!(filtered.is_empty());
    let filtered = repo
        .list_contact_messages(Some(ContactStatus::Read))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    repo.delete_contact_message(msg.id).await.unwrap();
    assert!(repo.list_contact_messages(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_moderator_nulls_audit_references() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    repo.upsert_user(9, "moderator", Role::Admin).await.unwrap();
    let article = repo.create_article(article_input(1, "kept")).await.unwrap();
    repo.set_article_block(article.id, true, Some("tos".into()), Some(9))
        .await
        .unwrap();

    repo.delete_user(9).await.unwrap();

    let article = repo.get_article(article.id).await.unwrap();
    assert!(article.blocked);
    assert_eq!(article.blocked_by, None);
    assert_eq!(article.blocked_reason.as_deref(), Some("tos"));
}

#[tokio::test]
async fn deleting_author_cascades_owned_content() {
    let repo = InMemRepo::new();
    seed_author(&repo, 1).await;
    repo.upsert_user(2, "commenter", Role::User).await.unwrap();
    let article = repo.create_article(article_input(1, "gone")).await.unwrap();
    repo.create_comment(CreateComment {
        article_id: article.id,
        author_id: 2,
        content: "by someone else".into(),
        parent_id: None,
    })
    .await
    .unwrap();

    repo.delete_user(1).await.unwrap();
    assert!(matches!(
        repo.get_article(article.id).await.unwrap_err(),
        RepoError::NotFound
    ));
    // Comments under the removed article go with it.
    assert!(repo.list_comments(article.id).await.unwrap().is_empty());
}
