mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use domains::CommentRepository;
use serde_json::json;

fn post_body() -> serde_json::Value {
    json!({
        "title": "First Post",
        "perex": "A short summary of the first post.",
        "content": "This is the content of the first post.",
    })
}

#[tokio::test]
async fn create_requires_a_token() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::POST, "/api/posts", None, Some(post_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header is missing");
}

#[tokio::test]
async fn created_post_is_listed_with_its_comments() {
    let app = TestApp::new();
    let (author, token) = app.user("john_doe").await;

    let (status, post) = app.request(Method::POST, "/api/posts", Some(&token), Some(post_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["authorId"], author.id);
    let post_id = post["id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/comments",
            Some(&token),
            Some(json!({ "postId": post_id, "content": "Great post!" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, posts) = app.request(Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts[0]["title"], "First Post");
    assert_eq!(posts[0]["comments"][0]["content"], "Great post!");

    let (status, single) = app.request(Method::GET, &format!("/api/posts/{post_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn short_title_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user("john_doe").await;
    let mut body = post_body();
    body["title"] = json!("Hey");

    let (status, body) = app.request(Method::POST, "/api/posts", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Title must be between 5 and 100 characters"));
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = TestApp::new();
    let (_, owner) = app.user("john_doe").await;
    let (_, other) = app.user("jane_doe").await;
    let (_, post) = app.request(Method::POST, "/api/posts", Some(&owner), Some(post_body())).await;
    let uri = format!("/api/posts/{}", post["id"]);

    let (status, _) = app.request(Method::PUT, &uri, Some(&other), Some(json!({ "title": "Hijacked title" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.request(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app.request(Method::PUT, &uri, Some(&owner), Some(json!({ "title": "Edited Post" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Edited Post");
    assert_eq!(updated["perex"], "A short summary of the first post.");
}

#[tokio::test]
async fn delete_cascades_to_comments() {
    let app = TestApp::new();
    let (_, token) = app.user("john_doe").await;
    let (_, post) = app.request(Method::POST, "/api/posts", Some(&token), Some(post_body())).await;
    let post_id = post["id"].as_i64().unwrap();
    app.request(
        Method::POST,
        "/api/comments",
        Some(&token),
        Some(json!({ "postId": post_id.to_string(), "content": "Thanks for sharing!" })),
    )
    .await;

    let (status, _) = app.request(Method::DELETE, &format!("/api/posts/{post_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, &format!("/api/posts/{post_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(CommentRepository::list(app.store.as_ref()).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/api/posts/first", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid post ID"));
}
