//! Shop resources: categories, products, and orders.

use std::time::Duration;

use http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_catalogue_is_read_only_for_users() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    let admin = app.admin_token().await;

    for collection in ["categories", "products"] {
        let uri = format!("/api/{collection}");
        let (status, _) = app
            .request(Method::POST, &uri, Some(&alice), Some(json!({"name": "Books"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{collection}");

        let (status, created) = app
            .request(Method::POST, &uri, Some(&admin), Some(json!({"name": "Books"})))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{collection}");
        assert!(created["owner"].is_null());

        let item = format!("{uri}/{}", created["id"]);
        let (status, _) = app.request(Method::GET, &item, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .request(Method::PUT, &item, Some(&alice), Some(json!({"name": "Films"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .request(Method::PUT, &item, Some(&admin), Some(json!({"name": "Films"})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_order_sends_confirmation() {
    let mut app = TestApp::new().await;
    let (id, alice) = app.user("alice").await;

    let (status, order) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&alice),
            Some(json!({"product_id": 1, "quantity": 2, "total": 19.5})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["owner"], id);

    let confirmation = tokio::time::timeout(Duration::from_secs(5), app.confirmations.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmation.order_id, order["id"].as_u64().unwrap());
    assert_eq!(confirmation.recipient, "alice@example.com");
    assert_eq!(confirmation.details["quantity"], 2);
}

#[tokio::test]
async fn test_order_email_overrides_recipient() {
    let mut app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    app.request(
        Method::POST,
        "/api/orders",
        Some(&alice),
        Some(json!({"product_id": 1, "quantity": 1, "email": "billing@example.com"})),
    )
    .await;
    let confirmation = tokio::time::timeout(Duration::from_secs(5), app.confirmations.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmation.recipient, "billing@example.com");
}

#[tokio::test]
async fn test_orders_belong_to_whoever_placed_them() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice").await;
    let (_, bob) = app.user("bob").await;
    let admin = app.admin_token().await;

    let (_, order) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&alice),
            Some(json!({"product_id": 3, "quantity": 1})),
        )
        .await;
    let uri = format!("/api/orders/{}", order["id"]);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&alice), Some(json!({"quantity": 4})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_anonymous_cannot_order() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(Method::POST, "/api/orders", None, Some(json!({"quantity": 1})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_order_is_404() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (status, body) = app
        .request(Method::GET, "/api/orders/99", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "order 99 not found");
}
