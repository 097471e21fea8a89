//! Catalog API access and in-memory catalog snapshots.
//!
//! # Architecture
//!
//! - The catalog API is the source of truth; the storefront never writes it
//!   except by forwarding admin requests
//! - [`CatalogClient`] fetches records over HTTP with a short `moka` cache
//! - [`CatalogStore`] holds the last good snapshot of each collection, which
//!   is what every catalog view is computed from
//! - [`spawn_refresher`] keeps the snapshots fresh in the background

mod cache;
pub mod client;
pub mod records;
pub mod store;

use std::time::Duration;

use cyborgtech_core::Collection;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use client::CatalogClient;
pub use store::{CatalogStore, RefreshTicket};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The admin token was missing or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the catalog API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("Catalog API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Refresh one collection, applying the result to the store.
///
/// Returns the number of products fetched.
///
/// # Errors
///
/// Returns the fetch error after recording it in the store.
pub async fn refresh_collection(
    client: &CatalogClient,
    store: &CatalogStore,
    collection: Collection,
) -> Result<usize, CatalogError> {
    let ticket = store.begin_refresh(collection);

    match client.fetch_collection(collection).await {
        Ok(products) => {
            let count = products.len();
            if store.complete_refresh(ticket, products) {
                info!(collection = %collection, count, "Catalog snapshot refreshed");
            }
            Ok(count)
        }
        Err(e) => {
            warn!(collection = %collection, error = %e, "Catalog refresh failed");
            store.fail_refresh(ticket, e.to_string());
            Err(e)
        }
    }
}

/// Refresh every collection concurrently.
pub async fn refresh_all(client: &CatalogClient, store: &CatalogStore) {
    let (products, handmade, builds) = tokio::join!(
        refresh_collection(client, store, Collection::Products),
        refresh_collection(client, store, Collection::Handmade),
        refresh_collection(client, store, Collection::Builds),
    );

    let failed = [products.is_err(), handmade.is_err(), builds.is_err()]
        .iter()
        .filter(|failed| **failed)
        .count();
    if failed > 0 {
        warn!(failed, "Catalog refresh finished with errors");
    }
}

/// Spawn the background task that refreshes the catalog every `interval`.
///
/// The first refresh runs immediately. Intervals under a second are raised
/// to one.
pub fn spawn_refresher(
    client: CatalogClient,
    store: CatalogStore,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh_all(&client, &store).await;
        }
    })
}
