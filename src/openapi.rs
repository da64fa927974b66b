use crate::models::{
    Article, BlockRequest, Comment, ContactMessage, ForumCategory, ForumComment, ForumThread,
    NewArticle, NewComment, NewContactMessage, NewForumBan, NewForumCategory, NewForumComment,
    NewForumThread, NewSubscriber, ReportRequest, Subscriber, UpdateArticle, UpdateContactStatus,
    UpdateForumCategory, UpdateForumThread, UserForumBan,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::articles::list_articles,
        crate::routes::articles::get_article,
        crate::routes::articles::create_article,
        crate::routes::articles::update_article,
        crate::routes::articles::delete_article,
        crate::routes::comments::list_article_comments,
        crate::routes::comments::create_comment,
        crate::routes::comments::report_comment,
        crate::routes::comments::delete_comment,
        crate::routes::forum::list_categories,
        crate::routes::forum::create_category,
        crate::routes::forum::list_threads,
        crate::routes::forum::create_thread,
        crate::routes::forum::get_thread,
        crate::routes::forum::list_thread_comments,
        crate::routes::forum::create_forum_comment,
        crate::routes::forum::ban_user,
        crate::routes::newsletter::subscribe,
        crate::routes::newsletter::unsubscribe,
        crate::routes::contact::submit_message,
    ),
    components(schemas(
        Article, NewArticle, UpdateArticle,
        Comment, NewComment, ReportRequest,
        ForumCategory, NewForumCategory, UpdateForumCategory,
        ForumThread, NewForumThread, UpdateForumThread,
        ForumComment, NewForumComment,
        UserForumBan, NewForumBan, BlockRequest,
        Subscriber, NewSubscriber,
        ContactMessage, NewContactMessage, UpdateContactStatus,
    )),
    tags(
        (name = "articles", description = "Blog article operations"),
        (name = "comments", description = "Article comment operations"),
        (name = "forum", description = "Forum category, thread and comment operations"),
        (name = "newsletter", description = "Newsletter subscription operations"),
        (name = "contact", description = "Contact inbox operations"),
    )
)]
pub struct ApiDoc;
