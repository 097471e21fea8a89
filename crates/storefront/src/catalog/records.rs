//! Wire records returned by the catalog API.
//!
//! The catalog API has been written against by more than one client, so the
//! same field shows up as `isOffer` in some payloads and `is_offer` in others.
//! Records accept both spellings and are normalized into
//! [`cyborgtech_core::Product`] by [`ProductRecord::into_product`].

use std::collections::BTreeMap;
use std::str::FromStr;

use cyborgtech_core::{BuildComponent, Collection, LocalizedText, Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// A price as sent by the API: either a JSON number or a display string
/// such as `"$2,999.99"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

impl RawPrice {
    /// Parse into a canonical price, `None` if the value is unusable.
    #[must_use]
    pub fn to_price(&self) -> Option<Price> {
        match self {
            Self::Number(number) => {
                let text = number.to_string();
                let amount = Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()?;
                Price::new(amount).ok()
            }
            Self::Text(text) => Price::parse_display(text).ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// A stock count that may arrive as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(i64),
    Text(String),
}

impl RawCount {
    /// Non-negative count, clamped into `u32`.
    #[must_use]
    pub fn to_count(&self) -> Option<u32> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(text) => text.trim().parse().ok()?,
        };
        Some(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    }
}

/// One component of a PC build record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    #[serde(alias = "product_id")]
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<RawCount>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A product, handmade item or build as stored by the catalog API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default, alias = "long_description")]
    pub long_description: Option<LocalizedText>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default, alias = "original_price")]
    pub original_price: Option<RawPrice>,
    #[serde(default, alias = "thumbnailImage", alias = "thumbnail_image")]
    pub image: Option<String>,
    #[serde(default, alias = "featureImages", alias = "feature_images")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub stock: Option<RawCount>,
    #[serde(default, alias = "is_offer")]
    pub is_offer: Option<bool>,
    #[serde(default, alias = "is_new")]
    pub is_new: Option<bool>,
    #[serde(default, alias = "is_popular")]
    pub is_popular: Option<bool>,
    #[serde(default, alias = "specifications")]
    pub specs: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub components: Option<Vec<ComponentRecord>>,
}

impl ProductRecord {
    /// Normalize into a catalog product.
    ///
    /// Unparseable prices become `None` (and are logged); the product is
    /// still listed but sorts last by price and cannot be added to a cart.
    #[must_use]
    pub fn into_product(self, collection: Collection) -> Product {
        let price = self.price.as_ref().and_then(|raw| {
            let parsed = raw.to_price();
            if parsed.is_none() {
                warn!(
                    product_id = %self.id,
                    price = %raw.describe(),
                    "Unparseable product price"
                );
            }
            parsed
        });
        let original_price = self.original_price.as_ref().and_then(RawPrice::to_price);

        let image = self.image.unwrap_or_default();
        let mut images = self.images.unwrap_or_default();
        if images.is_empty() && !image.is_empty() {
            images.push(image.clone());
        }

        let components = self
            .components
            .unwrap_or_default()
            .into_iter()
            .map(|component| BuildComponent {
                product_id: ProductId::new(component.product_id),
                quantity: component
                    .quantity
                    .as_ref()
                    .and_then(RawCount::to_count)
                    .unwrap_or(1)
                    .max(1),
                notes: component.notes.filter(|notes| !notes.trim().is_empty()),
            })
            .collect();

        Product {
            id: ProductId::new(self.id),
            collection,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            long_description: self.long_description.unwrap_or_default(),
            price,
            original_price,
            image,
            images,
            category: self.category.unwrap_or_default(),
            subcategory: self.subcategory.unwrap_or_default(),
            stock: self.stock.as_ref().and_then(RawCount::to_count),
            is_offer: self.is_offer.unwrap_or(false),
            is_new: self.is_new.unwrap_or(false),
            is_popular: self.is_popular.unwrap_or(false),
            specs: self.specs.unwrap_or_default(),
            brand: self.brand.filter(|brand| !brand.trim().is_empty()),
            components,
        }
    }
}

/// Decode a list payload, skipping (and logging) records that do not parse.
///
/// # Errors
///
/// Returns an error only if the payload is not a JSON array.
pub fn decode_collection(
    collection: Collection,
    body: &str,
) -> Result<Vec<Product>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = values.len();

    let products: Vec<Product> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ProductRecord>(value) {
            Ok(record) => Some(record.into_product(collection)),
            Err(e) => {
                warn!(collection = %collection, error = %e, "Skipping malformed catalog record");
                None
            }
        })
        .collect();

    if products.len() < total {
        warn!(
            collection = %collection,
            skipped = total - products.len(),
            "Some catalog records were skipped"
        );
    }

    Ok(products)
}

/// Decode a single-record payload.
///
/// # Errors
///
/// Returns an error if the payload is not a product record.
pub fn decode_product(collection: Collection, body: &str) -> Result<Product, serde_json::Error> {
    let record: ProductRecord = serde_json::from_str(body)?;
    Ok(record.into_product(collection))
}
