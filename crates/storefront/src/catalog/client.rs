//! REST client for the catalog API.
//!
//! Read endpoints are cached with `moka` for `CATALOG_CACHE_TTL_SECS`; admin
//! mutations go straight through and invalidate what they touch.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use cyborgtech_core::{Collection, Product};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::CatalogError;
use super::cache::{CacheKey, CacheValue};
use super::records::{decode_collection, decode_product};
use crate::config::CatalogConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the catalog REST API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base: String,
    cache: Cache<CacheKey, CacheValue>,
    /// Bumped by every invalidation of a collection.
    epochs: RwLock<HashMap<Collection, u64>>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base: config.api_url.as_str().trim_end_matches('/').to_string(),
                cache,
                epochs: RwLock::default(),
            }),
        })
    }

    fn epoch(&self, collection: Collection) -> u64 {
        let epochs = self.inner.epochs.read().unwrap_or_else(PoisonError::into_inner);
        epochs.get(&collection).copied().unwrap_or_default()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.inner.base)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, CatalogError> {
        let response = request.header("Accept", "application/json").send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(body.chars().take(200).collect()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized);
        }
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// Fetch every record of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a list.
    #[instrument(skip(self), fields(collection = %collection))]
    pub async fn fetch_collection(
        &self,
        collection: Collection,
    ) -> Result<Arc<[Product]>, CatalogError> {
        let cache_key = CacheKey::Collection(collection);

        if let Some(CacheValue::Collection(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(products);
        }

        let epoch = self.epoch(collection);
        let request = self.inner.client.get(self.endpoint(collection.as_str()));
        let body = self.execute(request).await?;

        let products: Arc<[Product]> = decode_collection(collection, &body)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse catalog listing"
                );
                CatalogError::Parse(e)
            })?
            .into();

        self.inner
            .cache
            .insert(cache_key.clone(), CacheValue::Collection(Arc::clone(&products)))
            .await;

        // A listing fetched across an admin change must not outlive it in the cache.
        if self.epoch(collection) != epoch {
            debug!("Collection changed during fetch, dropping cached listing");
            self.inner.cache.invalidate(&cache_key).await;
        }

        Ok(products)
    }

    /// Fetch a single record.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the record does not exist.
    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    pub async fn fetch_product(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(collection, id.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("{}/{}", collection.as_str(), urlencoding::encode(id));
        let body = self.execute(self.inner.client.get(self.endpoint(&path))).await?;
        let product = decode_product(collection, &body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Admin Methods
    // =========================================================================

    /// Create a record. Returns the stored record when the API echoes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, body, token), fields(collection = %collection))]
    pub async fn create(
        &self,
        collection: Collection,
        body: &serde_json::Value,
        token: &SecretString,
    ) -> Result<Option<Product>, CatalogError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("admin/{}", collection.as_str())))
            .bearer_auth(token.expose_secret())
            .json(body);
        let response = self.execute(request).await?;
        self.invalidate(collection, None).await;
        Ok(decode_product(collection, &response).ok())
    }

    /// Replace a record. Returns the stored record when the API echoes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, body, token), fields(collection = %collection, id = %id))]
    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        body: &serde_json::Value,
        token: &SecretString,
    ) -> Result<Option<Product>, CatalogError> {
        let path = format!("admin/{}/{}", collection.as_str(), urlencoding::encode(id));
        let request = self
            .inner
            .client
            .put(self.endpoint(&path))
            .bearer_auth(token.expose_secret())
            .json(body);
        let response = self.execute(request).await?;
        self.invalidate(collection, Some(id)).await;
        Ok(decode_product(collection, &response).ok())
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, token), fields(collection = %collection, id = %id))]
    pub async fn delete(
        &self,
        collection: Collection,
        id: &str,
        token: &SecretString,
    ) -> Result<(), CatalogError> {
        let path = format!("admin/{}/{}", collection.as_str(), urlencoding::encode(id));
        let request = self
            .inner
            .client
            .delete(self.endpoint(&path))
            .bearer_auth(token.expose_secret());
        self.execute(request).await?;
        self.invalidate(collection, Some(id)).await;
        Ok(())
    }

    /// Drop cached responses for a collection (and one of its records).
    pub async fn invalidate(&self, collection: Collection, id: Option<&str>) {
        {
            let mut epochs = self.inner.epochs.write().unwrap_or_else(PoisonError::into_inner);
            *epochs.entry(collection).or_default() += 1;
        }
        self.inner
            .cache
            .invalidate(&CacheKey::Collection(collection))
            .await;
        if let Some(id) = id {
            self.inner
                .cache
                .invalidate(&CacheKey::Product(collection, id.to_string()))
                .await;
        }
    }
}
