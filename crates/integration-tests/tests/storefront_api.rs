//! Storefront HTTP API, driven in-process.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use cyborgtech_integration_tests::{TestClient, empty_state, json_response, test_state};
use serde_json::{Value, json};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_always_ok() {
    let mut client = TestClient::new(empty_state().await);
    let (status, body) = client.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_readiness_waits_for_catalog() {
    let mut client = TestClient::new(empty_state().await);
    let (status, body) = client.get("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["catalog"]["products"]["status"], "loading");
    assert!(body["catalog"]["products"]["refreshed_at"].is_null());

    let mut client = TestClient::new(test_state().await);
    let (status, body) = client.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["catalog"]["builds"]["status"], "ready");
    assert!(body["catalog"]["builds"]["refreshed_at"].is_string());
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_is_unavailable_while_loading() {
    let mut client = TestClient::new(empty_state().await);
    let (status, body) = client.get("/api/products").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("loading")));
}

#[tokio::test]
async fn test_catalog_page_is_clamped() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client.get("/api/products?page=99").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 14);
    assert_eq!(body["page_size"], 12);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["filter"]["page"], 2);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_catalog_filters_and_sorts() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client
        .get("/api/products?category=peripherals&offers=true&sort=price_high")
        .await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, ["kb-1", "ms-1"]);
    assert_eq!(body["items"][0]["price"], "$10.00");
}

#[tokio::test]
async fn test_unknown_sort_is_bad_request() {
    let mut client = TestClient::new(test_state().await);
    let (status, _) = client.get("/api/products?sort=random").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subcategories() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client
        .get("/api/products/subcategories?category=accessories")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "accessories");
    assert_eq!(body["subcategories"], json!(["accessory", "lights", "cooling"]));
}

#[tokio::test]
async fn test_product_detail_follows_accept_language() {
    let mut client = TestClient::new(test_state().await);
    let request = Request::get("/api/products/gpu-1")
        .header(header::ACCEPT_LANGUAGE, "fr-CA, en;q=0.8")
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("{e}"));
    let (status, body) = json_response(client.send(request).await).await;

    // fr has no product text, so names fall back to the shop locale
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tarjeta RTX 4070");
    assert_eq!(body["price"], "$599.99");

    let request = Request::get("/api/products/gpu-1")
        .header(header::ACCEPT_LANGUAGE, "en-US")
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("{e}"));
    let (_, body) = json_response(client.send(request).await).await;
    assert_eq!(body["name"], "RTX 4070 Card");
    assert_eq!(body["description"], "Ray tracing and DLSS");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut client = TestClient::new(test_state().await);
    let (status, _) = client.get("/api/handmade/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart & Checkout
// ============================================================================

async fn add(client: &mut TestClient, product_id: &str) -> (StatusCode, Value) {
    client
        .post("/api/cart/add", &json!({ "product_id": product_id }))
        .await
}

#[tokio::test]
async fn test_cart_persists_across_requests() {
    let mut client = TestClient::new(test_state().await);

    add(&mut client, "kb-1").await;
    add(&mut client, "kb-1").await;
    let (status, body) = add(&mut client, "ms-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], "$25.00");

    let (_, body) = client.get("/api/cart/count").await;
    assert_eq!(body["count"], 3);

    let (_, body) = client.get("/api/cart").await;
    assert_eq!(body["items"][0]["name"], "Teclado RGB");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["subtotal"], "$20.00");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let state = test_state().await;
    let mut alice = TestClient::new(state.clone());
    let mut bob = TestClient::new(state);

    add(&mut alice, "gpu-1").await;

    let (_, body) = bob.get("/api/cart/count").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_cart_update_remove_and_clear() {
    let mut client = TestClient::new(test_state().await);
    add(&mut client, "fan-1").await;
    add(&mut client, "led-1").await;

    let (_, body) = client
        .post("/api/cart/update", &json!({ "product_id": "fan-1", "quantity": 4 }))
        .await;
    assert_eq!(body["item_count"], 5);
    assert_eq!(body["total"], "$65.00");

    let (_, body) = client
        .post("/api/cart/update", &json!({ "product_id": "led-1", "quantity": 0 }))
        .await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

    let (_, body) = client
        .post("/api/cart/remove", &json!({ "product_id": "fan-1" }))
        .await;
    assert_eq!(body["item_count"], 0);

    add(&mut client, "fan-1").await;
    let (_, body) = client.post("/api/cart/clear", &json!({})).await;
    assert_eq!(body["total"], "$0.00");
}

#[tokio::test]
async fn test_adding_unknown_or_unpriced_products() {
    let mut client = TestClient::new(test_state().await);

    let (status, _) = add(&mut client, "does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = add(&mut client, "cab-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_accepts_other_collections() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client
        .post(
            "/api/cart/add",
            &json!({ "product_id": "hm-1", "collection": "handmade" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["name"], "Llavero artesanal");
}

#[tokio::test]
async fn test_checkout_builds_whatsapp_order() {
    let mut client = TestClient::new(test_state().await);
    add(&mut client, "kb-1").await;
    add(&mut client, "kb-1").await;
    add(&mut client, "ms-1").await;

    let (status, body) = client.post("/api/cart/checkout", &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["summary"],
        "Pedido CyborgTech:\nTeclado RGB x2 - $20.00\nMouse inalámbrico x1 - $5.00\nTotal: $25.00"
    );
    assert!(
        body["url"]
            .as_str()
            .is_some_and(|url| url.starts_with("https://wa.me/525512345678?text=Pedido"))
    );
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client.post("/api/cart/checkout", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot check out an empty cart");
}

// ============================================================================
// Locale
// ============================================================================

#[tokio::test]
async fn test_translation_defaults_to_spanish() {
    let mut client = TestClient::new(test_state().await);
    let (_, body) = client.get("/api/i18n/t?key=cart.title").await;

    assert_eq!(body["locale"], "es");
    assert_eq!(body["value"], "Carrito de compras");
}

#[tokio::test]
async fn test_missing_key_comes_back_unchanged() {
    let mut client = TestClient::new(test_state().await);
    let (status, body) = client.get("/api/i18n/t?key=nonexistent.key").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "nonexistent.key");
}

#[tokio::test]
async fn test_locale_choice_sticks_to_session() {
    let mut client = TestClient::new(test_state().await);

    let (status, body) = client.post("/api/locale", &json!({ "locale": "en" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (_, body) = client.get("/api/i18n/t?key=cart.title").await;
    assert_eq!(body["value"], "Shopping cart");

    let (_, body) = client.get("/api/i18n").await;
    assert_eq!(body["locale"], "en");
    assert_eq!(body["messages"]["navbar"]["home"], "Home");

    // Product names and cart lines follow the session locale too
    let (_, body) = add(&mut client, "kb-1").await;
    assert_eq!(body["items"][0]["name"], "RGB Keyboard");
}

#[tokio::test]
async fn test_unsupported_locale_is_rejected() {
    let mut client = TestClient::new(test_state().await);
    let (status, _) = client.post("/api/locale", &json!({ "locale": "de" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Design tokens
// ============================================================================

#[tokio::test]
async fn test_design_tokens() {
    let mut client = TestClient::new(test_state().await);

    let (_, body) = client
        .get("/api/design/token?group=color&key=primary.500")
        .await;
    assert_eq!(body["value"], "#00f0ff");

    let (_, body) = client
        .get("/api/design/token?group=fontWeight&key=semibold")
        .await;
    assert_eq!(body["value"], "600");

    let (_, body) = client.get("/api/design/token?group=spacing&key=huge").await;
    assert_eq!(body["value"], "");

    let (status, _) = client.get("/api/design/token?group=zIndex&key=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_component_styles() {
    let mut client = TestClient::new(test_state().await);

    let (_, body) = client
        .get("/api/design/components/button?variant=primary")
        .await;
    assert_eq!(body["background"], "#00f0ff");

    let (_, body) = client.get("/api/design/components/carousel").await;
    assert_eq!(body, json!({}));
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_requires_bearer_token() {
    let mut client = TestClient::new(test_state().await);
    let (status, _) = client
        .post("/api/admin/products", &json!({ "name": "Nuevo" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::delete("/api/admin/products/gpu-1")
        .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("{e}"));
    let (status, _) = json_response(client.send(request).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
