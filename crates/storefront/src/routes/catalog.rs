//! Catalog route handlers.
//!
//! Views are computed from the in-memory catalog snapshot; the catalog API
//! is only hit directly for single products while the snapshot is loading.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cyborgtech_core::{
    BuildComponent, Collection, FilterState, LoadState, Locale, Product, Selector, SortKey,
    available_subcategories, compute_view,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequestLocale;
use crate::state::AppState;

// =============================================================================
// Query Parameters
// =============================================================================

/// Catalog view query parameters.
///
/// Everything is optional; unparseable pages fall back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub offers: Option<String>,
    pub page: Option<String>,
}

impl CatalogQuery {
    /// Build the filter state, applying parameters in the same order a
    /// visitor would so the reset rules hold.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown sort key.
    pub fn to_filter(&self) -> Result<FilterState> {
        let mut filter = FilterState::new();

        if let Some(category) = &self.category {
            filter.set_category(category.as_str());
        }
        if let Some(subcategory) = &self.subcategory {
            filter.set_subcategory(subcategory.as_str());
        }
        if let Some(q) = &self.q {
            filter.set_search(q.as_str());
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            let sort: SortKey = sort.parse().map_err(AppError::BadRequest)?;
            filter.set_sort(sort);
        }
        if let Some(offers) = &self.offers {
            filter.set_offers_only(is_truthy(offers));
        }
        if let Some(page) = self.page.as_deref().and_then(|p| p.trim().parse::<i64>().ok()) {
            filter.set_page(page);
        }

        Ok(filter)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Subcategory query parameters.
#[derive(Debug, Deserialize)]
pub struct SubcategoryQuery {
    pub category: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// A product as shown in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub collection: Collection,
    pub name: String,
    pub description: String,
    /// Display price (`$12.50`), absent if the price is unusable.
    pub price: Option<String>,
    pub price_amount: Option<Decimal>,
    pub original_price: Option<String>,
    pub image: String,
    pub category: String,
    pub subcategory: String,
    pub is_offer: bool,
    pub is_new: bool,
    pub is_popular: bool,
    pub sold_out: bool,
}

impl ProductSummary {
    #[must_use]
    pub fn new(product: &Product, locale: Locale, fallback: Locale) -> Self {
        Self {
            id: product.id.to_string(),
            collection: product.collection,
            name: product.display_name(locale, fallback).to_string(),
            description: product.display_description(locale, fallback).to_string(),
            price: product.price.map(|p| p.display()),
            price_amount: product.price.map(|p| p.amount()),
            original_price: product.original_price.map(|p| p.display()),
            image: product.image.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            is_offer: product.is_offer,
            is_new: product.is_new,
            is_popular: product.is_popular,
            sold_out: product.is_sold_out(),
        }
    }
}

/// A product detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub long_description: String,
    pub images: Vec<String>,
    pub stock: Option<u32>,
    pub brand: Option<String>,
    pub specs: BTreeMap<String, String>,
    pub components: Vec<BuildComponent>,
}

impl ProductDetail {
    #[must_use]
    pub fn new(product: &Product, locale: Locale, fallback: Locale) -> Self {
        Self {
            summary: ProductSummary::new(product, locale, fallback),
            long_description: product.long_description.resolve(locale, fallback).to_string(),
            images: product.images.clone(),
            stock: product.stock,
            brand: product.brand.clone(),
            specs: product.specs.clone(),
            components: product.components.clone(),
        }
    }
}

/// One page of a catalog view.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub collection: Collection,
    pub locale: Locale,
    pub filter: FilterState,
    pub items: Vec<ProductSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
}

/// Subcategories available for a category.
#[derive(Debug, Serialize)]
pub struct SubcategoryList {
    pub category: Selector,
    pub subcategories: Vec<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// The loaded snapshot of `collection`.
fn loaded_products(state: &AppState, collection: Collection) -> Result<Arc<[Product]>> {
    match state.catalog().state(collection) {
        LoadState::Ready(products) => Ok(products),
        LoadState::Loading => Err(AppError::Unavailable(format!(
            "{collection} catalog is loading"
        ))),
        LoadState::Failed(message) => Err(AppError::Unavailable(format!(
            "{collection} catalog unavailable: {message}"
        ))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Filtered, sorted and paginated catalog view.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>> {
    let filter = query.to_filter()?;
    let products = loaded_products(&state, collection)?;
    let fallback = state.config().default_locale;
    let page_size = state.config().page_sizes.for_collection(collection);

    let view = compute_view(&products, &filter, locale, fallback, page_size);

    Ok(Json(CatalogPage {
        collection,
        locale,
        items: view
            .items
            .iter()
            .map(|product| ProductSummary::new(product, locale, fallback))
            .collect(),
        page: view.page,
        total_pages: view.total_pages,
        total_count: view.total_count,
        page_size,
        filter: filter.with_page(i64::try_from(view.page).unwrap_or(1)),
    }))
}

/// Subcategories offered once a category is chosen.
#[instrument(skip(state))]
pub async fn subcategories(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    Query(query): Query<SubcategoryQuery>,
) -> Result<Json<SubcategoryList>> {
    let products = loaded_products(&state, collection)?;
    let category = Selector::parse(query.category.as_deref().unwrap_or_default());

    let subcategories = available_subcategories(&products, &category)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Json(SubcategoryList {
        category,
        subcategories,
    }))
}

/// One product, localized.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<ProductDetail>> {
    let fallback = state.config().default_locale;

    let product = match state.catalog().snapshot(collection) {
        Some(products) => products
            .iter()
            .find(|product| product.id.as_str() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{collection}/{id}")))?,
        None => state.catalog_client().fetch_product(collection, &id).await?,
    };

    Ok(Json(ProductDetail::new(&product, locale, fallback)))
}
