//! Cache types for catalog API responses.

use std::sync::Arc;

use cyborgtech_core::{Collection, Product};

/// Cache key for collection listings and single records.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Collection(Collection),
    Product(Collection, String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Collection(Arc<[Product]>),
    Product(Box<Product>),
}
