//! CyborgTech Core - Shared domain library.
//!
//! This crate provides the I/O-free heart of the CyborgTech storefront:
//! - `types` - Product ids, prices, locales, localized text and products
//! - `cart` - The cart store (line items, quantities, totals)
//! - `catalog` - The catalog filter engine (filter, search, sort, paginate)
//!
//! # Architecture
//!
//! Nothing in this crate touches the network, the filesystem or a clock.
//! Every operation is synchronous and deterministic, which keeps it safe to
//! call from request handlers and easy to test in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartLineItem};
pub use catalog::{CatalogView, FilterState, Selector, SortKey, available_subcategories, compute_view};
pub use types::*;
