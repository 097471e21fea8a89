//! Catalog client, refreshes and admin writes against a stub catalog API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use cyborgtech_core::{Collection, Product};
use cyborgtech_integration_tests::{
    TestClient, dec, json_response, products_fixture, seed, state_with, test_config,
};
use cyborgtech_storefront::catalog::{CatalogClient, CatalogError, CatalogStore, refresh_collection};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use url::Url;

const ADMIN_TOKEN: &str = "secret";

// ============================================================================
// Stub catalog API
// ============================================================================

#[derive(Clone, Default)]
struct Stub {
    listing_hits: Arc<AtomicUsize>,
    product_hits: Arc<AtomicUsize>,
    builds_hits: Arc<AtomicUsize>,
    /// Signalled when a builds listing request arrives.
    arrived: Arc<Notify>,
    /// Builds listings wait here before answering.
    gate: Arc<Notify>,
}

fn record(id: &str, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": { "es": name, "en": name },
        "price": price,
        "category": "components",
        "subcategory": "graphics",
    })
}

async fn products(State(stub): State<Stub>) -> Json<Value> {
    stub.listing_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        record("gpu-9", "Tarjeta Arc", 249.0),
        record("cpu-9", "Procesador Xeon", 899.0),
    ]))
}

async fn product(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    stub.product_hits.fetch_add(1, Ordering::SeqCst);
    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, "no such product").into_response(),
        "locked" => StatusCode::UNAUTHORIZED.into_response(),
        "forbidden" => StatusCode::FORBIDDEN.into_response(),
        "busy" => (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "7")]).into_response(),
        "throttled" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "database down").into_response(),
        _ => Json(record(&id, "Tarjeta", 100.0)).into_response(),
    }
}

async fn handmade() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn builds(State(stub): State<Stub>) -> Json<Value> {
    stub.builds_hits.fetch_add(1, Ordering::SeqCst);
    stub.arrived.notify_one();
    stub.gate.notified().await;
    Json(json!([record("build-9", "PC Estación", 1999.0)]))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&*format!("Bearer {ADMIN_TOKEN}"))
}

async fn admin_create(headers: HeaderMap) -> StatusCode {
    // Accepted without echoing the record back
    if authorized(&headers) {
        StatusCode::CREATED
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn admin_update(
    Path((_, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if let Some(fields) = body.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    Json(body).into_response()
}

async fn admin_delete(headers: HeaderMap) -> StatusCode {
    if authorized(&headers) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::FORBIDDEN
    }
}

/// Serve `stub` on an ephemeral local port, returning its base URL.
async fn serve(stub: Stub) -> Url {
    let app = Router::new()
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product))
        .route("/api/handmade", get(handmade))
        .route("/api/builds", get(builds))
        .route("/api/admin/{collection}", post(admin_create))
        .route(
            "/api/admin/{collection}/{id}",
            put(admin_update).delete(admin_delete),
        )
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("bind stub: {e}"));
    let addr = listener.local_addr().unwrap_or_else(|e| panic!("{e}"));
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .unwrap_or_else(|e| panic!("stub server: {e}"));
    });

    Url::parse(&format!("http://{addr}")).unwrap_or_else(|e| panic!("{e}"))
}

async fn client_for(stub: &Stub) -> CatalogClient {
    let mut config = test_config();
    config.catalog.api_url = serve(stub.clone()).await;
    CatalogClient::new(&config.catalog).unwrap_or_else(|e| panic!("{e}"))
}

// ============================================================================
// Client
// ============================================================================

async fn fetch(client: &CatalogClient, id: &str) -> Result<Product, CatalogError> {
    client.fetch_product(Collection::Products, id).await
}

#[tokio::test]
async fn test_error_statuses_map_to_catalog_errors() {
    let client = client_for(&Stub::default()).await;

    assert!(matches!(
        fetch(&client, "missing").await,
        Err(CatalogError::NotFound(body)) if body == "no such product"
    ));
    assert!(matches!(fetch(&client, "locked").await, Err(CatalogError::Unauthorized)));
    assert!(matches!(fetch(&client, "forbidden").await, Err(CatalogError::Unauthorized)));
    assert!(matches!(fetch(&client, "busy").await, Err(CatalogError::RateLimited(7))));
    assert!(matches!(fetch(&client, "throttled").await, Err(CatalogError::RateLimited(1))));
    assert!(matches!(
        fetch(&client, "broken").await,
        Err(CatalogError::Status { status: 500, body }) if body == "database down"
    ));

    let product = fetch(&client, "gpu-9").await.unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(product.id.as_str(), "gpu-9");
    assert_eq!(product.collection, Collection::Products);
    assert_eq!(product.price.map(|p| p.amount()), Some(dec("100")));
}

#[tokio::test]
async fn test_reads_are_cached_until_invalidated() {
    let stub = Stub::default();
    let client = client_for(&stub).await;

    let listing = client
        .fetch_collection(Collection::Products)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(listing.len(), 2);
    client
        .fetch_collection(Collection::Products)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(stub.listing_hits.load(Ordering::SeqCst), 1);

    for _ in 0..2 {
        client
            .fetch_product(Collection::Products, "gpu-9")
            .await
            .unwrap_or_else(|e| panic!("{e}"));
    }
    assert_eq!(stub.product_hits.load(Ordering::SeqCst), 1);

    client.invalidate(Collection::Products, Some("gpu-9")).await;

    client
        .fetch_collection(Collection::Products)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    client
        .fetch_product(Collection::Products, "gpu-9")
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(stub.listing_hits.load(Ordering::SeqCst), 2);
    assert_eq!(stub.product_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let stub = Stub::default();
    let client = client_for(&stub).await;

    for _ in 0..2 {
        assert!(client.fetch_product(Collection::Products, "broken").await.is_err());
    }
    assert_eq!(stub.product_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidation_during_fetch_is_not_undone() {
    let stub = Stub::default();
    let client = client_for(&stub).await;

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.fetch_collection(Collection::Builds).await }
    });

    // The listing is computed before the change but delivered after it
    stub.arrived.notified().await;
    client.invalidate(Collection::Builds, None).await;
    stub.gate.notify_one();

    let listing = in_flight
        .await
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(listing.len(), 1);

    stub.gate.notify_one();
    client
        .fetch_collection(Collection::Builds)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(stub.builds_hits.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_applies_snapshot() {
    let client = client_for(&Stub::default()).await;
    let store = CatalogStore::new();

    let count = refresh_collection(&client, &store, Collection::Products)
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(count, 2);
    assert_eq!(store.state(Collection::Products).status(), "ready");
    assert!(store.refreshed_at(Collection::Products).is_some());
    assert!(store.find(Collection::Products, "cpu-9").is_some());
}

#[tokio::test]
async fn test_refresh_failure_is_recorded() {
    let client = client_for(&Stub::default()).await;
    let store = CatalogStore::new();

    let result = refresh_collection(&client, &store, Collection::Handmade).await;

    assert!(matches!(result, Err(CatalogError::Status { status: 500, .. })));
    let state = store.state(Collection::Handmade);
    assert_eq!(state.status(), "failed");
    assert!(state.error().is_some_and(|message| message.contains("500")));
    assert!(store.refreshed_at(Collection::Handmade).is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_loaded_snapshot() {
    let client = client_for(&Stub::default()).await;
    let store = CatalogStore::new();
    let ticket = store.begin_refresh(Collection::Handmade);
    assert!(store.complete_refresh(ticket, products_fixture().into()));

    assert!(refresh_collection(&client, &store, Collection::Handmade).await.is_err());

    assert_eq!(store.state(Collection::Handmade).status(), "ready");
    assert_eq!(store.snapshot(Collection::Handmade).map(|p| p.len()), Some(14));
}

// ============================================================================
// Admin writes through the storefront
// ============================================================================

async fn storefront(stub: &Stub) -> TestClient {
    let mut config = test_config();
    config.catalog.api_url = serve(stub.clone()).await;
    let state = state_with(config).await;
    seed(&state, Collection::Products, products_fixture());
    TestClient::new(state)
}

fn admin_request(method: Method, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|e| panic!("{e}"))
}

#[tokio::test]
async fn test_admin_update_patches_snapshot() {
    let mut client = storefront(&Stub::default()).await;
    let body = json!({
        "name": { "es": "Tarjeta RTX 4070 Ti", "en": "RTX 4070 Ti Card" },
        "price": 699,
        "category": "components",
        "subcategory": "graphics",
    });

    let request = admin_request(Method::PUT, "/api/admin/products/gpu-1", ADMIN_TOKEN, Some(&body));
    let (status, _) = json_response(client.send(request).await).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = client.get("/api/products/gpu-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tarjeta RTX 4070 Ti");
    assert_eq!(body["price"], "$699.00");

    let (_, body) = client.get("/api/products").await;
    assert_eq!(body["total_count"], 14);
}

#[tokio::test]
async fn test_admin_delete_removes_from_snapshot() {
    let mut client = storefront(&Stub::default()).await;

    let request = admin_request(Method::DELETE, "/api/admin/products/kb-1", ADMIN_TOKEN, None);
    let (status, _) = json_response(client.send(request).await).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client.get("/api/products/kb-1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = client.get("/api/products").await;
    assert_eq!(body["total_count"], 13);
}

#[tokio::test]
async fn test_admin_rejected_token_leaves_snapshot() {
    let mut client = storefront(&Stub::default()).await;

    let request = admin_request(Method::DELETE, "/api/admin/products/kb-1", "wrong", None);
    let (status, _) = json_response(client.send(request).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = client.get("/api/products/kb-1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_create_without_echo_refreshes_collection() {
    let stub = Stub::default();
    let mut client = storefront(&stub).await;

    let body = json!({ "name": { "es": "Nuevo" }, "price": 10 });
    let request = admin_request(Method::POST, "/api/admin/products", ADMIN_TOKEN, Some(&body));
    let (status, body) = json_response(client.send(request).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, Value::Null);

    // The snapshot now mirrors the API listing
    assert_eq!(stub.listing_hits.load(Ordering::SeqCst), 1);
    let (_, body) = client.get("/api/products").await;
    assert_eq!(body["total_count"], 2);
}
