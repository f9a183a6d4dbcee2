//! Blog resources: authors, posts, and tags.

use std::time::Duration;

use http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_anonymous_cannot_list_posts() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["category"], "authentication");
}

#[tokio::test]
async fn test_author_owns_created_post() {
    let app = TestApp::new().await;
    let (id, token) = app.user("alice").await;
    let (status, post) = app
        .request(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({"title": "Hello", "body": "First post"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["owner"], id);
    assert_eq!(post["kind"], "post");
    assert_eq!(post["data"]["title"], "Hello");
}

#[tokio::test]
async fn test_only_owner_or_superuser_modifies_post() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    let (_, bob) = app.user("bob").await;
    let admin = app.admin_token().await;

    let (_, post) = app
        .request(
            Method::POST,
            "/api/posts",
            Some(&alice),
            Some(json!({"title": "Hello", "body": "First post"})),
        )
        .await;
    let uri = format!("/api/posts/{}", post["id"]);

    // Anyone signed in may read it.
    let (status, _) = app.request(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    // A stranger may not change or delete it.
    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&bob), Some(json!({"title": "Mine now"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "not allowed to update post");
    let (status, _) = app.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The author may.
    let (status, updated) = app
        .request(Method::PATCH, &uri, Some(&alice), Some(json!({"title": "Edited"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Edited");
    assert_eq!(updated["data"]["body"], "First post");

    // PUT replaces every attribute.
    let (status, replaced) = app
        .request(Method::PUT, &uri, Some(&alice), Some(json!({"title": "Replaced"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(replaced["data"].get("body").is_none());

    // So may a superuser.
    let (status, _) = app.request(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.request(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tags_are_superuser_only() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .request(Method::POST, "/api/tags", Some(&alice), Some(json!({"name": "rust"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, tag) = app
        .request(Method::POST, "/api/tags", Some(&admin), Some(json!({"name": "rust"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/tags/{}", tag["id"]);

    let (status, tags) = app.request(Method::GET, "/api/tags", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tags.as_array().unwrap().len(), 1);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.request(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_authors_are_accounts() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.user("alice").await;
    let (bob_id, bob) = app.user("bob").await;

    let (status, authors) = app.request(Method::GET, "/api/authors", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "alice", "bob"]);
    assert!(authors[0].get("email").is_none());

    let alice_uri = format!("/api/authors/{alice_id}");
    let (status, _) = app
        .request(Method::PATCH, &alice_uri, Some(&bob), Some(json!({"username": "eve"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, renamed) = app
        .request(Method::PATCH, &alice_uri, Some(&alice), Some(json!({"username": "alicia"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["username"], "alicia");

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/authors/{bob_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_creating_authors_requires_superuser() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    let admin = app.admin_token().await;
    let body = json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "long-enough"
    });

    let (status, _) = app
        .request(Method::POST, "/api/authors", Some(&alice), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, author) = app
        .request(Method::POST, "/api/authors", Some(&admin), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(author["username"], "carol");
}

#[tokio::test]
async fn test_unknown_collection_is_404() {
    let app = TestApp::new().await;
    let (_, token) = app.user("alice").await;
    let (status, body) = app.request(Method::GET, "/api/widgets", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["category"], "not_found");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = TestApp::new().await;
    let (_, token) = app.user("alice").await;
    let (status, _) = app
        .request(Method::POST, "/api/posts", Some(&token), Some(json!(["not", "an", "object"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retrieval_shares_the_store_with_readers() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.user("alice").await;
    let (_, post) = app
        .request(
            Method::POST,
            "/api/posts",
            Some(&alice),
            Some(json!({"title": "Hello", "body": "First post"})),
        )
        .await;

    // A retrieval must not wait for exclusive access while another reader holds the store.
    let _reader = app.state.store.read().await;
    for uri in [format!("/api/posts/{}", post["id"]), format!("/api/authors/{alice_id}")] {
        let (status, _) = tokio::time::timeout(
            Duration::from_secs(5),
            app.request(Method::GET, &uri, Some(&alice), None),
        )
        .await
        .expect("retrieval blocked behind a reader");
        assert_eq!(status, StatusCode::OK, "GET {uri}");
    }
}
