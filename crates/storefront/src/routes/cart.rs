//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Items are added by product id;
//! name, price and image are taken from the catalog snapshot, never from the
//! request.

use axum::{Json, extract::State};
use cyborgtech_core::{Cart, CartItem, CartLineItem, Collection, ProductId, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::checkout::{self, Checkout};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequestLocale, SessionCart};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            image: line.image.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.display(),
            subtotal: format_amount(line.subtotal()),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
    pub total_amount: Decimal,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            total: format_amount(cart.total()),
            total_amount: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Requests
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_collection")]
    pub collection: Collection,
}

const fn default_collection() -> Collection {
    Collection::Products
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(cart))]
pub async fn show(cart: SessionCart) -> Json<CartView> {
    Json(CartView::from(cart.cart()))
}

/// Add one unit of a product.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    mut cart: SessionCart,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let catalog = state.catalog();
    if catalog.snapshot(request.collection).is_none() {
        return Err(AppError::Unavailable(format!(
            "{} catalog is loading",
            request.collection
        )));
    }

    let product = catalog
        .find(request.collection, request.product_id.as_str())
        .ok_or_else(|| {
            AppError::NotFound(format!("{}/{}", request.collection, request.product_id))
        })?;

    let item = CartItem::from_product(&product, locale, state.config().default_locale)?;
    let quantity = cart.cart_mut().add(item);
    cart.save().await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", request.product_id.as_str()),
            ("quantity", &quantity.to_string()),
        ]),
    );

    Ok(Json(CartView::from(cart.cart())))
}

/// Set a line's quantity; zero or less removes the line.
#[instrument(skip(cart))]
pub async fn update(
    mut cart: SessionCart,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    cart.cart_mut()
        .update_quantity(request.product_id.as_str(), request.quantity);
    cart.save().await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove(
    mut cart: SessionCart,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    cart.cart_mut().remove(request.product_id.as_str());
    cart.save().await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(mut cart: SessionCart) -> Result<Json<CartView>> {
    cart.cart_mut().clear();
    cart.save().await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Item count for the cart badge.
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> Json<CartCount> {
    Json(CartCount {
        count: cart.cart().item_count(),
    })
}

/// Order summary and WhatsApp link for the current cart.
#[instrument(skip(state, cart))]
pub async fn checkout(State(state): State<AppState>, cart: SessionCart) -> Result<Json<Checkout>> {
    let checkout = checkout::prepare(cart.cart(), state.config().whatsapp_phone.as_deref())?;

    add_breadcrumb(
        "checkout",
        "Prepared WhatsApp checkout",
        Some(&[("items", &cart.cart().item_count().to_string())]),
    );

    Ok(Json(checkout))
}
