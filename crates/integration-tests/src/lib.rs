//! Integration tests for the CyborgTech storefront.
//!
//! The storefront router is driven in-process with `tower::ServiceExt`.
//! Catalog snapshots are seeded straight into the store; locale messages and
//! design tokens are read from the storefront's own `content/` directory.
//! Tests that exercise the catalog client run a stub catalog API on a local
//! ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cyborgtech-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart mutations and totals
//! - `catalog_api` - Catalog client, refreshes and admin writes against a stub API
//! - `catalog_engine` - Filtering, search, sorting and pagination
//! - `storefront_api` - HTTP routes, sessions and readiness

#![allow(clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use cyborgtech_core::{Collection, Locale, LocalizedText, Price, Product};
use cyborgtech_storefront::{build_router, config::StorefrontConfig, state::AppState};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

/// Shop phone used in checkout links.
pub const SHOP_PHONE: &str = "+52 (55) 1234-5678";

/// Storefront content shipped with the service crate.
#[must_use]
pub fn content_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/content"))
}

/// Configuration pointing at an unroutable catalog API.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    let api_url = Url::parse("http://127.0.0.1:9").unwrap_or_else(|e| panic!("{e}"));
    let mut config = StorefrontConfig::with_defaults("http://localhost:3000", api_url);
    config.content_dir = content_dir();
    config.whatsapp_phone = Some(SHOP_PHONE.to_string());
    config
}

/// Decimal from a literal.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap_or_else(|e| panic!("bad decimal {value}: {e}"))
}

/// A product with a Spanish and English name.
#[must_use]
pub fn product(
    id: &str,
    collection: Collection,
    name: (&str, &str),
    price: Option<&str>,
    category: &str,
    subcategory: &str,
) -> Product {
    let mut product = Product::new(
        id,
        collection,
        LocalizedText::new()
            .with(Locale::Es, name.0)
            .with(Locale::En, name.1),
        price.map(|p| Price::new(dec(p)).unwrap_or_else(|e| panic!("{e}"))),
        category,
    );
    product.subcategory = subcategory.to_string();
    product.image = format!("/img/{id}.webp");
    product
}

/// Fourteen products across three categories.
///
/// Offers: `kb-1`, `gpu-2`, `ms-1`. `cab-1` has no usable price.
#[must_use]
pub fn products_fixture() -> Vec<Product> {
    let c = Collection::Products;
    let mut products = vec![
        product("gpu-1", c, ("Tarjeta RTX 4070", "RTX 4070 Card"), Some("599.99"), "components", "graphics"),
        product("gpu-2", c, ("Tarjeta RX 7800", "RX 7800 Card"), Some("499.00"), "components", "graphics"),
        product("cpu-1", c, ("Procesador Ryzen 7", "Ryzen 7 Processor"), Some("329.50"), "components", "processor"),
        product("cpu-2", c, ("Procesador Core i5", "Core i5 Processor"), Some("219.00"), "components", "processor"),
        product("ram-1", c, ("Memoria DDR5 32GB", "DDR5 32GB Memory"), Some("119.90"), "components", "ram"),
        product("ssd-1", c, ("Disco NVMe 1TB", "NVMe 1TB Drive"), Some("89.00"), "components", "storage"),
        product("kb-1", c, ("Teclado RGB", "RGB Keyboard"), Some("10.00"), "peripherals", "keyboard"),
        product("kb-2", c, ("Teclado mecánico", "Mechanical keyboard"), Some("75.00"), "peripherals", "keyboard"),
        product("ms-1", c, ("Mouse inalámbrico", "Wireless mouse"), Some("5.00"), "peripherals", "mouse"),
        product("hs-1", c, ("Audífonos 7.1", "7.1 Headset"), Some("59.99"), "peripherals", "headset"),
        product("mon-1", c, ("Monitor 27 pulgadas", "27 inch Monitor"), Some("289.00"), "peripherals", "monitor"),
        product("cab-1", c, ("Cable HDMI", "HDMI Cable"), None, "accessories", "accessory"),
        product("led-1", c, ("Tira LED", "LED Strip"), Some("15.00"), "accessories", "lights"),
        product("fan-1", c, ("Ventilador 120mm", "120mm Fan"), Some("12.50"), "accessories", "cooling"),
    ];

    for product in &mut products {
        match product.id.as_str() {
            "kb-1" | "gpu-2" | "ms-1" => product.is_offer = true,
            "gpu-1" => {
                product.description = LocalizedText::new()
                    .with(Locale::Es, "Trazado de rayos y DLSS")
                    .with(Locale::En, "Ray tracing and DLSS");
            }
            _ => {}
        }
    }

    products
}

/// Seed one collection's snapshot as if a refresh had completed.
pub fn seed(state: &AppState, collection: Collection, products: Vec<Product>) {
    let ticket = state.catalog().begin_refresh(collection);
    let products: Arc<[Product]> = products.into();
    assert!(state.catalog().complete_refresh(ticket, products));
}

/// State with locale messages and design tokens loaded, and no catalog.
pub async fn empty_state() -> AppState {
    state_with(test_config()).await
}

/// State built from `config`, with locale messages and design tokens loaded.
pub async fn state_with(config: StorefrontConfig) -> AppState {
    let state = AppState::new(config).unwrap_or_else(|e| panic!("{e}"));
    state.i18n().load_all().await;
    state
        .design()
        .load(&content_dir().join("design-system.json"))
        .await
        .unwrap_or_else(|e| panic!("design tokens: {e}"));
    state
}

/// State with every collection loaded.
pub async fn test_state() -> AppState {
    let state = empty_state().await;
    seed(&state, Collection::Products, products_fixture());
    seed(
        &state,
        Collection::Handmade,
        vec![product(
            "hm-1",
            Collection::Handmade,
            ("Llavero artesanal", "Handmade keychain"),
            Some("8.00"),
            "crafts",
            "",
        )],
    );
    seed(
        &state,
        Collection::Builds,
        vec![product(
            "build-1",
            Collection::Builds,
            ("PC Gamer Neón", "Neon Gaming PC"),
            Some("1499.00"),
            "gaming",
            "",
        )],
    );
    state
}

/// An in-process storefront with a cookie jar of one session cookie.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state),
            cookie: None,
        }
    }

    /// Send `request`, carrying the session cookie across calls.
    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        let headers = request.headers_mut();
        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap_or_else(|e| panic!("{e}")));
        if let Some(cookie) = &self.cookie {
            headers.insert(header::COOKIE, cookie.parse().unwrap_or_else(|e| panic!("{e}")));
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        response
    }

    /// GET `uri`, returning the status and JSON body.
    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri)
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("{e}"));
        json_response(self.send(request).await).await
    }

    /// POST a JSON body to `uri`, returning the status and JSON body.
    pub async fn post(&mut self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|e| panic!("{e}"));
        json_response(self.send(request).await).await
    }
}

/// Split a response into its status and JSON body (`Null` when empty).
pub async fn json_response(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
