//! In-memory catalog snapshots.
//!
//! Each collection holds the last successfully fetched list of products. A
//! refresh is started with [`CatalogStore::begin_refresh`], which hands out a
//! ticket; only the completion carrying the newest ticket is applied, so a
//! slow response can never overwrite the result of a later one.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use cyborgtech_core::{Collection, LoadState, Product};
use tracing::debug;

/// Ticket for an in-flight refresh of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    collection: Collection,
    generation: u64,
}

impl RefreshTicket {
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: LoadState<Arc<[Product]>>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Shared catalog snapshots, one per collection.
#[derive(Clone, Default)]
pub struct CatalogStore {
    inner: Arc<RwLock<HashMap<Collection, Slot>>>,
}

impl CatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh, invalidating any refresh already in flight.
    #[must_use]
    pub fn begin_refresh(&self, collection: Collection) -> RefreshTicket {
        let mut slots = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(collection).or_default();
        slot.generation += 1;
        RefreshTicket {
            collection,
            generation: slot.generation,
        }
    }

    /// Apply a successful fetch. Returns `false` if the ticket is stale.
    pub fn complete_refresh(&self, ticket: RefreshTicket, products: Arc<[Product]>) -> bool {
        let mut slots = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(ticket.collection).or_default();
        if slot.generation != ticket.generation {
            debug!(collection = %ticket.collection, "Discarding stale catalog refresh");
            return false;
        }
        slot.state = LoadState::Ready(products);
        slot.refreshed_at = Some(Utc::now());
        true
    }

    /// Record a failed fetch. A collection that already loaded keeps its
    /// snapshot. Returns `false` if the ticket is stale.
    pub fn fail_refresh(&self, ticket: RefreshTicket, message: impl Into<String>) -> bool {
        let mut slots = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(ticket.collection).or_default();
        if slot.generation != ticket.generation {
            return false;
        }
        slot.state.fail(message);
        true
    }

    /// Current state of a collection.
    #[must_use]
    pub fn state(&self, collection: Collection) -> LoadState<Arc<[Product]>> {
        let slots = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&collection)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    /// The loaded products of a collection, if any.
    #[must_use]
    pub fn snapshot(&self, collection: Collection) -> Option<Arc<[Product]>> {
        self.state(collection).ready().cloned()
    }

    /// Look up one loaded product by id.
    #[must_use]
    pub fn find(&self, collection: Collection, id: &str) -> Option<Product> {
        self.snapshot(collection)?
            .iter()
            .find(|product| product.id.as_str() == id)
            .cloned()
    }

    /// When the collection was last refreshed successfully.
    #[must_use]
    pub fn refreshed_at(&self, collection: Collection) -> Option<DateTime<Utc>> {
        let slots = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&collection).and_then(|slot| slot.refreshed_at)
    }

    /// Whether every collection has loaded at least once.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        Collection::ALL
            .iter()
            .all(|collection| self.state(*collection).is_ready())
    }

    /// Insert or replace a product in a loaded collection.
    ///
    /// In-flight refreshes are invalidated so they cannot drop the change.
    /// Collections that have not loaded yet are left alone.
    pub fn upsert(&self, product: Product) -> bool {
        let collection = product.collection;
        self.modify(collection, |products| {
            if let Some(existing) = products.iter_mut().find(|p| p.id == product.id) {
                *existing = product;
            } else {
                products.push(product);
            }
            true
        })
    }

    /// Remove a product from a loaded collection.
    pub fn remove(&self, collection: Collection, id: &str) -> bool {
        self.modify(collection, |products| {
            let before = products.len();
            products.retain(|product| product.id.as_str() != id);
            products.len() != before
        })
    }

    /// Forget every snapshot and invalidate in-flight refreshes.
    pub fn reset(&self) {
        let mut slots = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for slot in slots.values_mut() {
            slot.generation += 1;
            slot.state = LoadState::Loading;
            slot.refreshed_at = None;
        }
    }

    fn modify(&self, collection: Collection, f: impl FnOnce(&mut Vec<Product>) -> bool) -> bool {
        let mut slots = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = slots.get_mut(&collection) else {
            return false;
        };
        let Some(current) = slot.state.ready() else {
            return false;
        };

        let mut products = current.to_vec();
        let changed = f(&mut products);
        if changed {
            slot.generation += 1;
            slot.state = LoadState::Ready(products.into());
        }
        changed
    }
}
