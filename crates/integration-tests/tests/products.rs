//! Product listing and seller-only endpoints.

use axum::http::StatusCode;
use quickcart_integration_tests::TestApp;
use serde_json::{Value, json};

fn lamp() -> Value {
    json!({
        "name": "Desk Lamp",
        "description": "Warm light",
        "price": 25.0,
        "offerPrice": 20.0,
        "category": "Home",
        "image": ["https://img.example/lamp.png"],
    })
}

#[tokio::test]
async fn buyers_get_forbidden_on_seller_routes() {
    let app = TestApp::new();
    let cookie = app.sign_in("buyer_1", "buyer@x.io").await;

    let response = app.post_json("/api/product/add", Some(&cookie), &lamp()).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    for uri in ["/api/product/seller-list", "/api/order/seller-orders"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn seller_lists_product_owned_by_subject() {
    let app = TestApp::new();
    let cookie = app.sign_in_seller("seller_1", "seller@x.io").await;

    let response = app.post_json("/api/product/add", Some(&cookie), &lamp()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["userId"], "seller_1");
    assert_eq!(response.body["offerPrice"], json!(20.0));
    let id = response.body["id"].as_i64().unwrap_or_default();

    let response = app.get("/api/product/seller-list", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"][0]["id"], id);

    let response = app.get(&format!("/product/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Desk Lamp");

    let response = app.get("/", None).await;
    assert_eq!(response.body["products"][0]["id"], id);
}

#[tokio::test]
async fn product_without_required_field_is_rejected() {
    let app = TestApp::new();
    let cookie = app.sign_in_seller("seller_1", "seller@x.io").await;

    let mut no_images = lamp();
    no_images["image"] = json!([]);
    let response = app.post_json("/api/product/add", Some(&cookie), &no_images).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut no_name = lamp();
    no_name.as_object_mut().map(|o| o.remove("name"));
    let response = app.post_json("/api/product/add", Some(&cookie), &no_name).await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn product_list_needs_a_session() {
    let app = TestApp::new();

    assert_eq!(
        app.get("/api/product/list", None).await.status,
        StatusCode::UNAUTHORIZED
    );

    let cookie = app.sign_in("buyer_1", "buyer@x.io").await;
    let response = app.get("/api/product/list", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"], json!([]));
}
