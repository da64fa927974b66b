//! In-memory repository backend. Mirrors the Postgres schema semantics —
//! unique constraints, cascade chains, SET NULL audit references — so the
//! integration tests exercise the same rules without a database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::*;
use crate::auth::Role;

#[derive(Default)]
struct State {
    users: HashMap<Id, (String, Role)>,
    articles: HashMap<Id, Article>,
    comments: HashMap<Id, Comment>,
    categories: HashMap<Id, ForumCategory>,
    threads: HashMap<Id, ForumThread>,
    forum_comments: HashMap<Id, ForumComment>,
    // Keyed by user id: the schema allows at most one ban row per user.
    bans: HashMap<Id, UserForumBan>,
    subscribers: HashMap<Id, Subscriber>,
    contacts: HashMap<Id, ContactMessage>,
    next_id: Id,
}

impl State {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    /// Remove the given comments plus every descendant reachable through
    /// `parent_id` (the ON DELETE CASCADE chain on the self-reference).
    fn cascade_comments(&mut self, mut doomed: Vec<Id>) {
        while !doomed.is_empty() {
            for id in doomed.drain(..).collect::<Vec<_>>() {
                self.comments.remove(&id);
            }
            doomed = self
                .comments
                .values()
                .filter(|c| c.parent_id.map(|p| !self.comments.contains_key(&p)).unwrap_or(false))
                .map(|c| c.id)
                .collect();
        }
    }

    fn cascade_forum_comments(&mut self, mut doomed: Vec<Id>) {
        while !doomed.is_empty() {
            for id in doomed.drain(..).collect::<Vec<_>>() {
                self.forum_comments.remove(&id);
            }
            doomed = self
                .forum_comments
                .values()
                .filter(|c| {
                    c.parent_comment_id
                        .map(|p| !self.forum_comments.contains_key(&p))
                        .unwrap_or(false)
                })
                .map(|c| c.id)
                .collect();
        }
    }

    fn remove_thread_rows(&mut self, thread_ids: &[Id]) {
        let doomed: Vec<Id> = self
            .forum_comments
            .values()
            .filter(|c| thread_ids.contains(&c.thread_id))
            .map(|c| c.id)
            .collect();
        self.cascade_forum_comments(doomed);
        for id in thread_ids {
            self.threads.remove(id);
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemRepo {
    state: Arc<RwLock<State>>,
}

impl InMemRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for InMemRepo {
    async fn upsert_user(&self, id: Id, name: &str, role: Role) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        s.users.insert(id, (name.to_string(), role));
        Ok(())
    }

    async fn delete_user(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if s.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        // Owned content cascades.
        let articles: Vec<Id> = s
            .articles
            .values()
            .filter(|a| a.author_id == id)
            .map(|a| a.id)
            .collect();
        for article_id in &articles {
            let doomed: Vec<Id> = s
                .comments
                .values()
                .filter(|c| c.article_id == *article_id)
                .map(|c| c.id)
                .collect();
            s.cascade_comments(doomed);
            s.articles.remove(article_id);
        }
        let authored: Vec<Id> = s
            .comments
            .values()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        s.cascade_comments(authored);

        let categories: Vec<Id> = s
            .categories
            .values()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        for category_id in &categories {
            let threads: Vec<Id> = s
                .threads
                .values()
                .filter(|t| t.category_id == *category_id)
                .map(|t| t.id)
                .collect();
            s.remove_thread_rows(&threads);
            s.categories.remove(category_id);
        }
        let threads: Vec<Id> = s
            .threads
            .values()
            .filter(|t| t.user_id == id)
            .map(|t| t.id)
            .collect();
        s.remove_thread_rows(&threads);
        let posted: Vec<Id> = s
            .forum_comments
            .values()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        s.cascade_forum_comments(posted);
        s.bans.remove(&id);

        // Audit references go SET NULL, preserving the moderated rows.
        for a in s.articles.values_mut() {
            if a.blocked_by == Some(id) {
                a.blocked_by = None;
            }
        }
        for c in s.comments.values_mut() {
            if c.reported_by == Some(id) {
                c.reported_by = None;
            }
        }
        for c in s.categories.values_mut() {
            if c.blocked_by == Some(id) {
                c.blocked_by = None;
            }
        }
        for b in s.bans.values_mut() {
            if b.banned_by == Some(id) {
                b.banned_by = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleRepo for InMemRepo {
    async fn list_articles(&self, include_hidden: bool) -> RepoResult<Vec<Article>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .articles
            .values()
            .filter(|a| include_hidden || (a.status == ArticleStatus::Published && !a.blocked))
            .cloned()
            .collect();
        v.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(v)
    }

    async fn list_articles_by_author(&self, author_id: Id) -> RepoResult<Vec<Article>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .articles
            .values()
            .filter(|a| a.author_id == author_id)
            .cloned()
            .collect();
        v.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(v)
    }

    async fn get_article(&self, id: Id) -> RepoResult<Article> {
        let s = self.state.read().unwrap();
        s.articles.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create_article(&self, new: CreateArticle) -> RepoResult<Article> {
        let mut s = self.state.write().unwrap();
        if s.articles.values().any(|a| a.slug == new.slug) {
            return Err(RepoError::Conflict);
        }
        let now = Utc::now();
        let id = s.next_id();
        let article = Article {
            id,
            author_id: new.author_id,
            title: new.title,
            slug: new.slug,
            content: new.content,
            status: new.status,
            blocked: false,
            blocked_reason: None,
            blocked_by: None,
            blocked_at: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        s.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: Id, upd: UpdateArticle) -> RepoResult<Article> {
        let mut s = self.state.write().unwrap();
        if let Some(ref slug) = upd.slug {
            if s.articles.values().any(|a| a.slug == *slug && a.id != id) {
                return Err(RepoError::Conflict);
            }
        }
        let article = s.articles.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(title) = upd.title {
            article.title = title;
        }
        if let Some(slug) = upd.slug {
            article.slug = slug;
        }
        if let Some(content) = upd.content {
            article.content = content;
        }
        if let Some(status) = upd.status {
            article.status = status;
        }
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn delete_article(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if s.articles.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let doomed: Vec<Id> = s
            .comments
            .values()
            .filter(|c| c.article_id == id)
            .map(|c| c.id)
            .collect();
        s.cascade_comments(doomed);
        Ok(())
    }

    async fn set_article_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<Article> {
        let mut s = self.state.write().unwrap();
        let article = s.articles.get_mut(&id).ok_or(RepoError::NotFound)?;
        article.blocked = blocked;
        if blocked {
            article.blocked_reason = reason;
            article.blocked_by = moderator;
            article.blocked_at = Some(Utc::now());
        } else {
            article.blocked_reason = None;
            article.blocked_by = None;
            article.blocked_at = None;
        }
        Ok(article.clone())
    }

    async fn bump_article_views(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        let article = s.articles.get_mut(&id).ok_or(RepoError::NotFound)?;
        article.view_count += 1;
        Ok(())
    }
}

#[async_trait]
impl CommentRepo for InMemRepo {
    async fn list_comments(&self, article_id: Id) -> RepoResult<Vec<Comment>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        v.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(v)
    }

    async fn get_comment(&self, id: Id) -> RepoResult<Comment> {
        let s = self.state.read().unwrap();
        s.comments.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create_comment(&self, new: CreateComment) -> RepoResult<Comment> {
        let mut s = self.state.write().unwrap();
        if !s.articles.contains_key(&new.article_id) {
            return Err(RepoError::NotFound);
        }
        if let Some(parent) = new.parent_id {
            if !s.comments.contains_key(&parent) {
                return Err(RepoError::NotFound);
            }
        }
        let id = s.next_id();
        let comment = Comment {
            id,
            article_id: new.article_id,
            author_id: new.author_id,
            content: new.content,
            parent_id: new.parent_id,
            reported: false,
            report_reason: None,
            reported_by: None,
            reported_at: None,
            created_at: Utc::now(),
        };
        s.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn report_comment(
        &self,
        id: Id,
        reason: Option<String>,
        reporter: Option<Id>,
    ) -> RepoResult<Comment> {
        let mut s = self.state.write().unwrap();
        let comment = s.comments.get_mut(&id).ok_or(RepoError::NotFound)?;
        comment.reported = true;
        comment.report_reason = reason;
        comment.reported_by = reporter;
        comment.reported_at = Some(Utc::now());
        Ok(comment.clone())
    }

    async fn clear_comment_report(&self, id: Id) -> RepoResult<Comment> {
        let mut s = self.state.write().unwrap();
        let comment = s.comments.get_mut(&id).ok_or(RepoError::NotFound)?;
        comment.reported = false;
        comment.report_reason = None;
        comment.reported_by = None;
        comment.reported_at = None;
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if !s.comments.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        s.cascade_comments(vec![id]);
        Ok(())
    }
}

#[async_trait]
impl ForumRepo for InMemRepo {
    async fn list_categories(&self, include_hidden: bool) -> RepoResult<Vec<ForumCategory>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .categories
            .values()
            .filter(|c| include_hidden || !c.is_blocked)
            .cloned()
            .collect();
        v.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(v)
    }

    async fn get_category(&self, id: Id) -> RepoResult<ForumCategory> {
        let s = self.state.read().unwrap();
        s.categories.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create_category(&self, new: CreateForumCategory) -> RepoResult<ForumCategory> {
        let mut s = self.state.write().unwrap();
        if s.categories.values().any(|c| c.slug == new.slug) {
            return Err(RepoError::Conflict);
        }
        let id = s.next_id();
        let category = ForumCategory {
            id,
            user_id: new.user_id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            is_blocked: false,
            blocked_reason: None,
            blocked_by: None,
            blocked_at: None,
            created_at: Utc::now(),
        };
        s.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Id,
        upd: UpdateForumCategory,
    ) -> RepoResult<ForumCategory> {
        let mut s = self.state.write().unwrap();
        if let Some(ref slug) = upd.slug {
            if s.categories.values().any(|c| c.slug == *slug && c.id != id) {
                return Err(RepoError::Conflict);
            }
        }
        let category = s.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(name) = upd.name {
            category.name = name;
        }
        if let Some(slug) = upd.slug {
            category.slug = slug;
        }
        if let Some(description) = upd.description {
            category.description = Some(description);
        }
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if s.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let threads: Vec<Id> = s
            .threads
            .values()
            .filter(|t| t.category_id == id)
            .map(|t| t.id)
            .collect();
        s.remove_thread_rows(&threads);
        Ok(())
    }

    async fn set_category_block(
        &self,
        id: Id,
        blocked: bool,
        reason: Option<String>,
        moderator: Option<Id>,
    ) -> RepoResult<ForumCategory> {
        let mut s = self.state.write().unwrap();
        let category = s.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.is_blocked = blocked;
        if blocked {
            category.blocked_reason = reason;
            category.blocked_by = moderator;
            category.blocked_at = Some(Utc::now());
        } else {
            category.blocked_reason = None;
            category.blocked_by = None;
            category.blocked_at = None;
        }
        Ok(category.clone())
    }

    async fn list_threads(
        &self,
        category_id: Id,
        include_hidden: bool,
    ) -> RepoResult<Vec<ForumThread>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .threads
            .values()
            .filter(|t| t.category_id == category_id && (include_hidden || !t.is_blocked))
            .cloned()
            .collect();
        v.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.last_activity_at.cmp(&a.last_activity_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(v)
    }

    async fn get_thread(&self, id: Id) -> RepoResult<ForumThread> {
        let s = self.state.read().unwrap();
        s.threads.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create_thread(&self, new: CreateForumThread) -> RepoResult<ForumThread> {
        let mut s = self.state.write().unwrap();
        if !s.categories.contains_key(&new.category_id) {
            return Err(RepoError::NotFound);
        }
        if s.threads.values().any(|t| t.slug == new.slug) {
            return Err(RepoError::Conflict);
        }
        let now = Utc::now();
        let id = s.next_id();
        let thread = ForumThread {
            id,
            category_id: new.category_id,
            user_id: new.user_id,
            title: new.title,
            slug: new.slug,
            content: new.content,
            is_blocked: false,
            is_pinned: false,
            is_locked: false,
            view_count: 0,
            last_activity_at: now,
            created_at: now,
        };
        s.threads.insert(id, thread.clone());
        Ok(thread)
    }

    async fn update_thread(&self, id: Id, upd: UpdateForumThread) -> RepoResult<ForumThread> {
        let mut s = self.state.write().unwrap();
        if let Some(ref slug) = upd.slug {
            if s.threads.values().any(|t| t.slug == *slug && t.id != id) {
                return Err(RepoError::Conflict);
            }
        }
        let thread = s.threads.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(title) = upd.title {
            thread.title = title;
        }
        if let Some(slug) = upd.slug {
            thread.slug = slug;
        }
        if let Some(content) = upd.content {
            thread.content = content;
        }
        Ok(thread.clone())
    }

    async fn delete_thread(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if !s.threads.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        s.remove_thread_rows(&[id]);
        Ok(())
    }

    async fn set_thread_block(&self, id: Id, blocked: bool) -> RepoResult<ForumThread> {
        let mut s = self.state.write().unwrap();
        let thread = s.threads.get_mut(&id).ok_or(RepoError::NotFound)?;
        thread.is_blocked = blocked;
        Ok(thread.clone())
    }

    async fn set_thread_pinned(&self, id: Id, pinned: bool) -> RepoResult<ForumThread> {
        let mut s = self.state.write().unwrap();
        let thread = s.threads.get_mut(&id).ok_or(RepoError::NotFound)?;
        thread.is_pinned = pinned;
        Ok(thread.clone())
    }

    async fn set_thread_locked(&self, id: Id, locked: bool) -> RepoResult<ForumThread> {
        let mut s = self.state.write().unwrap();
        let thread = s.threads.get_mut(&id).ok_or(RepoError::NotFound)?;
        thread.is_locked = locked;
        Ok(thread.clone())
    }

    async fn bump_thread_views(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        let thread = s.threads.get_mut(&id).ok_or(RepoError::NotFound)?;
        thread.view_count += 1;
        Ok(())
    }

    async fn list_thread_comments(
        &self,
        thread_id: Id,
        include_hidden: bool,
    ) -> RepoResult<Vec<ForumComment>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .forum_comments
            .values()
            .filter(|c| c.thread_id == thread_id && (include_hidden || !c.is_blocked))
            .cloned()
            .collect();
        v.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(v)
    }

    async fn get_forum_comment(&self, id: Id) -> RepoResult<ForumComment> {
        let s = self.state.read().unwrap();
        s.forum_comments.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create_forum_comment(&self, new: CreateForumComment) -> RepoResult<ForumComment> {
        let mut s = self.state.write().unwrap();
        if !s.threads.contains_key(&new.thread_id) {
            return Err(RepoError::NotFound);
        }
        if let Some(parent) = new.parent_comment_id {
            if !s.forum_comments.contains_key(&parent) {
                return Err(RepoError::NotFound);
            }
        }
        let now = Utc::now();
        let id = s.next_id();
        let comment = ForumComment {
            id,
            thread_id: new.thread_id,
            user_id: new.user_id,
            content: new.content,
            parent_comment_id: new.parent_comment_id,
            is_blocked: false,
            created_at: now,
        };
        s.forum_comments.insert(id, comment.clone());
        if let Some(thread) = s.threads.get_mut(&new.thread_id) {
            thread.last_activity_at = now;
        }
        Ok(comment)
    }

    async fn set_forum_comment_block(&self, id: Id, blocked: bool) -> RepoResult<ForumComment> {
        let mut s = self.state.write().unwrap();
        let comment = s.forum_comments.get_mut(&id).ok_or(RepoError::NotFound)?;
        comment.is_blocked = blocked;
        Ok(comment.clone())
    }

    async fn delete_forum_comment(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if !s.forum_comments.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        s.cascade_forum_comments(vec![id]);
        Ok(())
    }
}

#[async_trait]
impl BanRepo for InMemRepo {
    async fn ban_user(
        &self,
        new: NewForumBan,
        banned_by: Option<Id>,
    ) -> RepoResult<UserForumBan> {
        let mut s = self.state.write().unwrap();
        // Banning an unknown user trips the foreign key in Postgres.
        if !s.users.contains_key(&new.user_id) {
            return Err(RepoError::NotFound);
        }
        let now = Utc::now();
        let id = match s.bans.get(&new.user_id) {
            Some(existing) => existing.id,
            None => s.next_id(),
        };
        let ban = UserForumBan {
            id,
            user_id: new.user_id,
            reason: new.reason,
            banned_by,
            banned_at: now,
            expires_at: new.expires_at,
        };
        s.bans.insert(new.user_id, ban.clone());
        Ok(ban)
    }

    async fn lift_ban(&self, user_id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        s.bans
            .remove(&user_id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn find_ban(&self, user_id: Id) -> RepoResult<Option<UserForumBan>> {
        let s = self.state.read().unwrap();
        Ok(s.bans.get(&user_id).cloned())
    }

    async fn list_bans(&self) -> RepoResult<Vec<UserForumBan>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s.bans.values().cloned().collect();
        v.sort_by(|a, b| b.banned_at.cmp(&a.banned_at).then(b.id.cmp(&a.id)));
        Ok(v)
    }
}

#[async_trait]
impl NewsletterRepo for InMemRepo {
    async fn subscribe(&self, new: CreateSubscriber) -> RepoResult<Subscriber> {
        let mut s = self.state.write().unwrap();
        if let Some(existing) = s.subscribers.values_mut().find(|x| x.email == new.email) {
            return match existing.status {
                SubscriptionStatus::Active => Err(RepoError::Conflict),
                SubscriptionStatus::Unsubscribed => {
                    existing.status = SubscriptionStatus::Active;
                    existing.unsubscribed_at = None;
                    existing.subscribed_at = Utc::now();
                    Ok(existing.clone())
                }
            };
        }
        let id = s.next_id();
        let subscriber = Subscriber {
            id,
            email: new.email,
            token: new.token,
            status: SubscriptionStatus::Active,
            subscribed_at: Utc::now(),
            unsubscribed_at: None,
        };
        s.subscribers.insert(id, subscriber.clone());
        Ok(subscriber)
    }

    async fn unsubscribe_by_token(&self, token: &str) -> RepoResult<Subscriber> {
        let mut s = self.state.write().unwrap();
        let subscriber = s
            .subscribers
            .values_mut()
            .find(|x| x.token == token)
            .ok_or(RepoError::NotFound)?;
        if subscriber.status != SubscriptionStatus::Unsubscribed {
            subscriber.status = SubscriptionStatus::Unsubscribed;
            subscriber.unsubscribed_at = Some(Utc::now());
        }
        Ok(subscriber.clone())
    }

    async fn list_subscribers(&self, include_unsubscribed: bool) -> RepoResult<Vec<Subscriber>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .subscribers
            .values()
            .filter(|x| include_unsubscribed || x.status == SubscriptionStatus::Active)
            .cloned()
            .collect();
        v.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(v)
    }
}

#[async_trait]
impl ContactRepo for InMemRepo {
    async fn create_contact_message(
        &self,
        new: NewContactMessage,
    ) -> RepoResult<ContactMessage> {
        let mut s = self.state.write().unwrap();
        let id = s.next_id();
        let message = ContactMessage {
            id,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        s.contacts.insert(id, message.clone());
        Ok(message)
    }

    async fn list_contact_messages(
        &self,
        status: Option<ContactStatus>,
    ) -> RepoResult<Vec<ContactMessage>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .contacts
            .values()
            .filter(|m| status.map(|wanted| m.status == wanted).unwrap_or(true))
            .cloned()
            .collect();
        v.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(v)
    }

    async fn set_contact_status(
        &self,
        id: Id,
        status: ContactStatus,
    ) -> RepoResult<ContactMessage> {
        let mut s = self.state.write().unwrap();
        let message = s.contacts.get_mut(&id).ok_or(RepoError::NotFound)?;
        message.status = status;
        Ok(message.clone())
    }

    async fn delete_contact_message(&self, id: Id) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        s.contacts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
