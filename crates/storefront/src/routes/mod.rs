//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (collection = products | handmade | builds)
//! GET    /api/{collection}                    - Filtered, sorted, paginated view
//! GET    /api/{collection}/subcategories      - Subcategories of ?category=
//! GET    /api/{collection}/{id}               - Product detail
//!
//! # Cart (session-backed)
//! GET    /api/cart                            - Cart view
//! POST   /api/cart/add                        - Add one unit of a product
//! POST   /api/cart/update                     - Set a line's quantity
//! POST   /api/cart/remove                     - Remove a line
//! POST   /api/cart/clear                      - Empty the cart
//! GET    /api/cart/count                      - Badge count
//! POST   /api/cart/checkout                   - Order summary + WhatsApp link
//!
//! # Locale
//! GET    /api/i18n                            - Messages of the active locale
//! GET    /api/i18n/t?key=                     - Translate one key
//! POST   /api/locale                          - Switch locale
//!
//! # Design tokens
//! GET    /api/design/tokens                   - Full token document
//! GET    /api/design/token?group=&key=        - One token value
//! GET    /api/design/components/{component}   - Component style (?variant=)
//!
//! # Admin (bearer token forwarded to the catalog API, rate limited)
//! POST   /api/admin/{collection}              - Create
//! PUT    /api/admin/{collection}/{id}         - Update
//! DELETE /api/admin/{collection}/{id}         - Delete
//! ```

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod design;
pub mod i18n;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/{collection}", get(catalog::index))
        .route("/{collection}/subcategories", get(catalog::subcategories))
        .route("/{collection}/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the locale routes router.
pub fn i18n_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(i18n::messages))
        .route("/t", get(i18n::translate))
}

/// Create the design token routes router.
pub fn design_routes() -> Router<AppState> {
    Router::new()
        .route("/tokens", get(design::tokens))
        .route("/token", get(design::token))
        .route("/components/{component}", get(design::component))
}

/// Create the admin routes router.
///
/// Rate limiting is applied by the caller so tests can mount these routes
/// without a peer address.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/{collection}", post(admin::create))
        .route(
            "/api/admin/{collection}/{id}",
            put(admin::update).delete(admin::delete),
        )
}

/// Create all public routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .nest("/api/i18n", i18n_routes())
        .route("/api/locale", post(i18n::change_locale))
        .nest("/api/design", design_routes())
        .nest("/api", catalog_routes())
}
