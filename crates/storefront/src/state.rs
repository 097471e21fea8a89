//! Application state shared across handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use crate::catalog::{self, CatalogClient, CatalogError, CatalogStore};
use crate::config::StorefrontConfig;
use crate::design::DesignTokens;
use crate::i18n::I18n;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog snapshots, locale messages, design tokens and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog_client: CatalogClient,
    catalog: CatalogStore,
    i18n: I18n,
    design: DesignTokens,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Nothing is loaded yet; call [`AppState::start_background_loading`]
    /// once the runtime is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog_client = CatalogClient::new(&config.catalog)?;
        let i18n = I18n::new(&config.content_dir, config.default_locale);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog_client,
                catalog: CatalogStore::new(),
                i18n,
                design: DesignTokens::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog_client(&self) -> &CatalogClient {
        &self.inner.catalog_client
    }

    /// Get a reference to the catalog snapshots.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    /// Get a reference to the locale messages.
    #[must_use]
    pub fn i18n(&self) -> &I18n {
        &self.inner.i18n
    }

    /// Get a reference to the design tokens.
    #[must_use]
    pub fn design(&self) -> &DesignTokens {
        &self.inner.design
    }

    /// Start loading locale messages and design tokens, and start the
    /// periodic catalog refresher.
    ///
    /// Returns the refresher's handle.
    pub fn start_background_loading(&self) -> JoinHandle<()> {
        let i18n = self.i18n().clone();
        tokio::spawn(async move {
            i18n.load_all().await;
        });

        let design = self.design().clone();
        let path = self.config().content_dir.join("design-system.json");
        tokio::spawn(async move {
            if let Err(e) = design.load(&path).await {
                error!(error = %e, "Design tokens unavailable");
            }
        });

        catalog::spawn_refresher(
            self.catalog_client().clone(),
            self.catalog().clone(),
            self.config().catalog.refresh_interval,
        )
    }
}
