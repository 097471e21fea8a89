//! Cart store.
//!
//! A cart is an ordered list of line items with at most one line per product
//! id. Quantities are always at least 1 while a line exists; setting a
//! quantity to zero (or below) removes the line instead.
//!
//! The cart is plain data (`Serialize`/`Deserialize`), so callers can snapshot
//! it into whatever scoped storage they use and restore it later.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Locale, Price, Product, ProductId};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product {0} has no valid price and cannot be added to the cart")]
    Unpriced(ProductId),
}

/// Descriptor passed to [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
}

impl CartItem {
    /// Build a cart descriptor from a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Unpriced` if the product's price failed to parse
    /// when it was ingested.
    pub fn from_product(
        product: &Product,
        locale: Locale,
        fallback: Locale,
    ) -> Result<Self, CartError> {
        let unit_price = product
            .price
            .ok_or_else(|| CartError::Unpriced(product.id.clone()))?;

        Ok(Self {
            id: product.id.clone(),
            name: product.display_name(locale, fallback).to_string(),
            unit_price,
            image: product.image.clone(),
        })
    }
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// The cart store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `item`, returning the line's new quantity.
    ///
    /// An existing line for the same id has its quantity incremented; the
    /// name, price and image of the existing line are kept.
    pub fn add(&mut self, item: CartItem) -> u32 {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.items.push(CartLineItem {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            image: item.image,
            quantity: 1,
        });
        1
    }

    /// Set the quantity of the line for `id` exactly.
    ///
    /// A quantity of zero or less removes the line. Unknown ids are ignored.
    /// Quantities above `u32::MAX` saturate.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.id.as_str() == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove the line for `id`, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<CartLineItem> {
        let index = self.items.iter().position(|line| line.id.as_str() == id)?;
        Some(self.items.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ(unit price × quantity); zero for an empty cart. Saturates at
    /// [`Decimal::MAX`] rather than overflowing.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartLineItem::subtotal)
            .fold(Decimal::ZERO, |total, subtotal| {
                total.checked_add(subtotal).unwrap_or(Decimal::MAX)
            })
    }

    /// Σ(quantity), used for badge counters.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
