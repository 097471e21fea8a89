//! Catalog products as seen by the storefront.
//!
//! Records from every catalog collection (regular products, handmade items
//! and PC builds) are normalized into a single [`Product`] at ingestion time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::locale::{Locale, LocalizedText};
use super::price::Price;

/// The catalog collection a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Handmade,
    Builds,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 3] = [Self::Products, Self::Handmade, Self::Builds];

    /// Path segment used by the catalog API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Handmade => "handmade",
            Self::Builds => "builds",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "handmade" => Ok(Self::Handmade),
            "builds" => Ok(Self::Builds),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

/// One component of a PC build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildComponent {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A catalog product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub collection: Collection,
    pub name: LocalizedText,
    pub description: LocalizedText,
    #[serde(default, skip_serializing_if = "LocalizedText::is_empty")]
    pub long_description: LocalizedText,
    /// Canonical price; `None` when the source value could not be parsed.
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default)]
    pub is_offer: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<BuildComponent>,
}

impl Product {
    /// Minimal product, mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        collection: Collection,
        name: LocalizedText,
        price: Option<Price>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            collection,
            name,
            description: LocalizedText::new(),
            long_description: LocalizedText::new(),
            price,
            original_price: None,
            image: String::new(),
            images: Vec::new(),
            category: category.into(),
            subcategory: String::new(),
            stock: None,
            is_offer: false,
            is_new: false,
            is_popular: false,
            specs: BTreeMap::new(),
            brand: None,
            components: Vec::new(),
        }
    }

    /// Localized display name.
    #[must_use]
    pub fn display_name(&self, locale: Locale, fallback: Locale) -> &str {
        self.name.resolve(locale, fallback)
    }

    /// Localized short description.
    #[must_use]
    pub fn display_description(&self, locale: Locale, fallback: Locale) -> &str {
        self.description.resolve(locale, fallback)
    }

    /// Whether stock is known to be exhausted.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.stock == Some(0)
    }
}
