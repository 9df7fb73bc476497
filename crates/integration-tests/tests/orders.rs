//! Addresses and orders.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use quickcart_core::models::{NewProduct, Product};
use quickcart_core::{OwnerId, Price};
use quickcart_integration_tests::TestApp;
use serde_json::{Value, json};

fn address() -> Value {
    json!({
        "address": {
            "fullName": "Ada Lovelace",
            "phoneNumber": "5550100",
            "pincode": "10001",
            "area": "12 Analytical Way",
            "city": "London",
            "state": "Greater London",
        }
    })
}

async fn product(app: &TestApp, name: &str, offer_cents: i64) -> Product {
    app.state
        .products()
        .create(
            &OwnerId::new("seller_1"),
            &NewProduct {
                name: name.to_string(),
                description: None,
                price: Price::from_cents(offer_cents + 500),
                offer_price: Price::from_cents(offer_cents),
                category: "Home".to_string(),
                image: vec!["https://img.example/p.png".to_string()],
            },
        )
        .await
        .unwrap()
}

async fn saved_address(app: &TestApp, cookie: &str) -> i64 {
    let response = app
        .post_json("/api/user/add-address", Some(cookie), &address())
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn addresses_are_listed_per_user() {
    let app = TestApp::new();
    let ada = app.sign_in("user_ada", "ada@x.io").await;
    let bob = app.sign_in("user_bob", "bob@x.io").await;

    saved_address(&app, &ada).await;

    let response = app.get("/api/user/get-address", Some(&ada)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["addresses"][0]["city"], "London");
    assert_eq!(response.body["addresses"][0]["userId"], "user_ada");

    let response = app.get("/api/user/get-address", Some(&bob)).await;
    assert_eq!(response.body["addresses"], json!([]));
}

#[tokio::test]
async fn incomplete_address_fails_validation() {
    let app = TestApp::new();
    let cookie = app.sign_in("user_ada", "ada@x.io").await;

    let mut body = address();
    body["address"]["city"] = Value::Null;
    let response = app
        .post_json("/api/user/add-address", Some(&cookie), &body)
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn order_amount_uses_offer_prices_and_clears_cart() {
    let app = TestApp::new();
    let lamp = product(&app, "Lamp", 2000).await;
    let mug = product(&app, "Mug", 550).await;

    let cookie = app.sign_in("user_ada", "ada@x.io").await;
    let address_id = saved_address(&app, &cookie).await;
    app.post_json(
        "/api/cart/update",
        Some(&cookie),
        &json!({ "cartData": { (lamp.id.to_string()): 2 } }),
    )
    .await;

    let response = app
        .post_json(
            "/api/order/create",
            Some(&cookie),
            &json!({
                "address": address_id,
                "items": [
                    { "product": lamp.id, "quantity": 2 },
                    { "product": mug.id, "quantity": 2 },
                ],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "Order Placed");
    assert_eq!(response.body["amount"], json!(51.0));
    assert_eq!(response.body["userId"], "user_ada");

    let user = app.user("ada@x.io").await;
    assert!(user.cart_items.is_empty());

    let response = app.get("/api/order/list", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let order = &response.body["orders"][0];
    assert_eq!(order["address"]["fullName"], "Ada Lovelace");
    assert_eq!(order["items"][0]["product"]["name"], "Lamp");
    assert_eq!(order["items"][1]["quantity"], 2);
}

#[tokio::test]
async fn order_rejects_bad_input() {
    let app = TestApp::new();
    let lamp = product(&app, "Lamp", 2000).await;
    let cookie = app.sign_in("user_ada", "ada@x.io").await;
    let address_id = saved_address(&app, &cookie).await;

    let empty = json!({ "address": address_id, "items": [] });
    let unknown_product = json!({
        "address": address_id,
        "items": [{ "product": 9999, "quantity": 1 }],
    });
    let zero_quantity = json!({
        "address": address_id,
        "items": [{ "product": lamp.id, "quantity": 0 }],
    });
    let unknown_address = json!({
        "address": 9999,
        "items": [{ "product": lamp.id, "quantity": 1 }],
    });

    for body in [empty, unknown_product, zero_quantity, unknown_address] {
        let response = app.post_json("/api/order/create", Some(&cookie), &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }

    let other = app.sign_in("user_bob", "bob@x.io").await;
    let response = app
        .post_json(
            "/api/order/create",
            Some(&other),
            &json!({ "address": address_id, "items": [{ "product": lamp.id, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seller_sees_every_order() {
    let app = TestApp::new();
    let lamp = product(&app, "Lamp", 2000).await;

    for (subject, email) in [("user_ada", "ada@x.io"), ("user_bob", "bob@x.io")] {
        let cookie = app.sign_in(subject, email).await;
        let address_id = saved_address(&app, &cookie).await;
        let response = app
            .post_json(
                "/api/order/create",
                Some(&cookie),
                &json!({ "address": address_id, "items": [{ "product": lamp.id, "quantity": 1 }] }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let seller = app.sign_in_seller("seller_1", "seller@x.io").await;
    let response = app.get("/api/order/seller-orders", Some(&seller)).await;
    assert_eq!(response.status, StatusCode::OK);
    let orders = response.body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["order"]["userId"], "user_bob");
}

#[tokio::test]
async fn order_total_overflow_is_rejected() {
    let app = TestApp::new();
    let yacht = product(&app, "Yacht", 100_000_000_000_000).await;
    let cookie = app.sign_in("user_ada", "ada@x.io").await;
    let address_id = saved_address(&app, &cookie).await;

    let response = app
        .post_json(
            "/api/order/create",
            Some(&cookie),
            &json!({
                "address": address_id,
                "items": [{ "product": yacht.id, "quantity": i64::MAX }],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Bad request: order total is too large");

    let response = app.get("/api/order/list", Some(&cookie)).await;
    assert_eq!(response.body["orders"], json!([]));
}
