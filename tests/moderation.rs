#![cfg(feature = "inmem-store")]

use actix_web::{test, App};
use arbor::auth::{create_jwt, Role};
use arbor::rate_limit::RateLimiterFacade;
use arbor::repo::inmem::InMemRepo;
use arbor::routes::{config, AppState};
use arbor::security::SecurityHeaders;
use serial_test::serial;
use std::sync::Arc;

fn setup_env() {
    std::env::set_var("JWT_SECRET", "test-secret-must-be-32-bytes-long!!");
}

fn admin_token() -> String {
    create_jwt(1, "admin", Role::Admin).unwrap()
}
fn author_token() -> String {
    create_jwt(2, "author", Role::Author).unwrap()
}
fn other_author_token() -> String {
    create_jwt(4, "rival", Role::Author).unwrap()
}
fn user_token() -> String {
    create_jwt(3, "reader", Role::User).unwrap()
}

macro_rules! test_app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(AppState {
                    repo: Arc::new($repo),
                    limits: RateLimiterFacade::disabled(),
                }))
                .configure(config),
        )
        .await
    };
}

async fn json_body(resp: actix_web::dev::ServiceResponse) -> serde_json::Value {
    serde_json::from_slice(&test::read_body(resp).await).unwrap()
}

#[actix_web::test]
#[serial]
async fn blocked_article_hidden_from_public_but_not_owner() {
    setup_env();
    let app = test_app!(InMemRepo::new());

    let req = test::TestRequest::post()
        .uri("/api/v1/articles")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({
            "title": "Contested post",
            "content": "body",
            "status": "published"
        }))
        .to_request();
    let article = json_body(test::call_service(&app, req).await).await;
    let id = article["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/articles/{id}/block"))
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .set_json(serde_json::json!({"reason": "reported"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let blocked = json_body(resp).await;
    assert_eq!(blocked["blocked"], true);
    assert_eq!(blocked["blocked_by"], 1);

    // anonymous and unrelated users see a 404
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/articles/{id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/articles/{id}"))
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // the owner and admins still can
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/articles/{id}"))
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    // hidden from the public listing, present with include_hidden for admins
    let req = test::TestRequest::get().uri("/api/v1/articles").to_request();
    assert_eq!(
        json_body(test::call_service(&app, req).await)
            .await
            .as_array()
            .unwrap()
            .len(),
        0
    );
    let req = test::TestRequest::get()
        .uri("/api/v1/articles?include_hidden=1")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    assert_eq!(
        json_body(test::call_service(&app, req).await)
            .await
            .as_array()
            .unwrap()
            .len(),
        1
    );
    // the flag is ignored for non-admins
    let req = test::TestRequest::get()
        .uri("/api/v1/articles?include_hidden=1")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    assert_eq!(
        json_body(test::call_service(&app, req).await)
            .await
            .as_array()
            .unwrap()
            .len(),
        0
    );

    // unblock restores visibility and clears the audit fields
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/articles/{id}/unblock"))
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    let unblocked = json_body(test::call_service(&app, req).await).await;
    assert_eq!(unblocked["blocked"], false);
    assert!(unblocked["blocked_reason"].is_null());
    assert!(unblocked["blocked_by"].is_null());
}

#[actix_web::test]
#[serial]
async fn report_flags_comment_without_hiding_it() {
    setup_env();
    let app = test_app!(InMemRepo::new());

    let req = test::TestRequest::post()
        .uri("/api/v1/articles")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({
            "title": "Some article",
            "content": "body",
            "status": "published"
        }))
        .to_request();
    let article = json_body(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/comments")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .set_json(serde_json::json!({"article_id": article["id"], "content": "rude"}))
        .to_request();
    let comment = json_body(test::call_service(&app, req).await).await;
    let comment_id = comment["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/comments/{comment_id}/report"))
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({"reason": "abuse"}))
        .to_request();
    let reported = json_body(test::call_service(&app, req).await).await;
    assert_eq!(reported["reported"], true);
    assert_eq!(reported["reported_by"], 2);

    // still listed publicly
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/articles/{}/comments", article["id"]))
        .to_request();
    assert_eq!(
        json_body(test::call_service(&app, req).await)
            .await
            .as_array()
            .unwrap()
            .len(),
        1
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/comments/{comment_id}/clear-report"))
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    let cleared = json_body(test::call_service(&app, req).await).await;
    assert_eq!(cleared["reported"], false);
    assert!(cleared["report_reason"].is_null());
}

#[actix_web::test]
#[serial]
async fn locked_thread_edit_and_delete_asymmetry() {
    setup_env();
    let app = test_app!(InMemRepo::new());

    let req = test::TestRequest::post()
        .uri("/api/v1/forum/categories")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({"name": "General"}))
        .to_request();
    let category = json_body(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/forum/threads")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({
            "category_id": category["id"],
            "title": "Heated debate",
            "content": "opening"
        }))
        .to_request();
    let thread = json_body(test::call_service(&app, req).await).await;
    let thread_id = thread["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/forum/threads/{thread_id}/lock"))
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    let locked = json_body(test::call_service(&app, req).await).await;
    assert_eq!(locked["is_locked"], true);

    // replies bounce off the lock, except from admins
    let req = test::TestRequest::post()
        .uri("/api/v1/forum/comments")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({"thread_id": thread_id, "content": "late word"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
    let req = test::TestRequest::post()
        .uri("/api/v1/forum/comments")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .set_json(serde_json::json!({"thread_id": thread_id, "content": "closing note"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    // the owner cannot edit a locked thread
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/forum/threads/{thread_id}"))
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({"title": "Retitled"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    // but may still delete it
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/forum/threads/{thread_id}"))
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
}

#[actix_web::test]
#[serial]
async fn banned_user_cannot_post_until_lifted() {
    setup_env();
    let app = test_app!(InMemRepo::new());

    let req = test::TestRequest::post()
        .uri("/api/v1/forum/categories")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({"name": "General"}))
        .to_request();
    let category = json_body(test::call_service(&app, req).await).await;

    // the target posts once so a user row exists
    let req = test::TestRequest::post()
        .uri("/api/v1/forum/threads")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .set_json(serde_json::json!({
            "category_id": category["id"],
            "title": "Before the ban",
            "content": "hello"
        }))
        .to_request();
    let thread = json_body(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/forum/bans")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .set_json(serde_json::json!({"user_id": 3, "reason": "spam"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    // forum writes now refuse the banned user
    let req = test::TestRequest::post()
        .uri("/api/v1/forum/threads")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .set_json(serde_json::json!({
            "category_id": category["id"],
            "title": "During the ban",
            "content": "still here"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
    let req = test::TestRequest::post()
        .uri("/api/v1/forum/comments")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .set_json(serde_json::json!({"thread_id": thread["id"], "content": "me again"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    // reading stays open
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/forum/threads/{}", thread["id"]))
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    // re-banning supersedes in place; the registry lists a single entry
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/forum/bans")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .set_json(serde_json::json!({"user_id": 3, "reason": "spam again"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/forum/bans")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    let bans = json_body(test::call_service(&app, req).await).await;
    assert_eq!(bans.as_array().unwrap().len(), 1);
    assert_eq!(bans[0]["reason"], "spam again");

    let req = test::TestRequest::delete()
        .uri("/api/v1/admin/forum/bans/3")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::post()
        .uri("/api/v1/forum/threads")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .set_json(serde_json::json!({
            "category_id": category["id"],
            "title": "After the ban",
            "content": "back"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);
}

#[actix_web::test]
#[serial]
async fn authors_cannot_touch_each_others_content() {
    setup_env();
    let app = test_app!(InMemRepo::new());

    let req = test::TestRequest::post()
        .uri("/api/v1/articles")
        .insert_header(("Authorization", format!("Bearer {}", author_token())))
        .set_json(serde_json::json!({
            "title": "Mine alone",
            "content": "body",
            "status": "published"
        }))
        .to_request();
    let article = json_body(test::call_service(&app, req).await).await;
    let id = article["id"].as_i64().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/articles/{id}"))
        .insert_header(("Authorization", format!("Bearer {}", other_author_token())))
        .set_json(serde_json::json!({"title": "Hijacked"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/articles/{id}"))
        .insert_header(("Authorization", format!("Bearer {}", other_author_token())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    // moderation endpoints refuse non-admins outright
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/articles/{id}/block"))
        .insert_header(("Authorization", format!("Bearer {}", other_author_token())))
        .set_json(serde_json::json!({"reason": "nope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_web::test]
#[serial]
async fn security_headers_present_on_responses() {
    setup_env();
    let repo = InMemRepo::new();
    let app = test::init_service(
        App::new()
            .wrap(SecurityHeaders::default())
            .app_data(actix_web::web::Data::new(AppState {
                repo: Arc::new(repo),
                limits: RateLimiterFacade::disabled(),
            }))
            .configure(config),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/articles").to_request();
    let resp = test::call_service(&app, req).await;
    let headers = resp.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("content-security-policy").is_some());
    assert!(headers.get("strict-transport-security").is_none());
}
