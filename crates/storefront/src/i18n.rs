//! Locale message trees and translation lookup.
//!
//! Message trees live in `<content_dir>/i18n/<code>.json`, one nested JSON
//! object per supported locale. Keys are dot-separated paths into the tree
//! (`"products.filters.all"`). Lookups never fail: a key that cannot be
//! resolved is returned unchanged so the UI shows something readable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use cyborgtech_core::{LoadState, Locale, SUPPORTED_LOCALES};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors raised while loading a message tree.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("failed to read messages for {locale}: {source}")]
    Io {
        locale: Locale,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse messages for {locale}: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },
    #[error("messages for {0} must be a JSON object")]
    NotAnObject(Locale),
}

/// A parsed message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTree(Value);

impl MessageTree {
    /// Wrap a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the value back if it is not an object.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        if value.is_object() { Ok(Self(value)) } else { Err(value) }
    }

    /// Resolve a dotted key to a string leaf.
    ///
    /// Missing segments and non-string leaves resolve to `None`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        key.split('.')
            .try_fold(&self.0, |node, segment| node.get(segment))?
            .as_str()
    }

    /// The raw tree.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Message trees for every supported locale.
#[derive(Clone)]
pub struct I18n {
    inner: Arc<I18nInner>,
}

struct I18nInner {
    dir: PathBuf,
    fallback: Locale,
    trees: RwLock<HashMap<Locale, LoadState<Arc<MessageTree>>>>,
}

impl I18n {
    /// Create a resolver reading from `<content_dir>/i18n`.
    ///
    /// Nothing is loaded until [`I18n::load`] or [`I18n::load_all`] runs.
    #[must_use]
    pub fn new(content_dir: &Path, fallback: Locale) -> Self {
        Self {
            inner: Arc::new(I18nInner {
                dir: content_dir.join("i18n"),
                fallback,
                trees: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Locale used when the active locale cannot be loaded.
    #[must_use]
    pub fn fallback(&self) -> Locale {
        self.inner.fallback
    }

    /// Load state of a locale.
    #[must_use]
    pub fn state(&self, locale: Locale) -> LoadState<Arc<MessageTree>> {
        let trees = self.inner.trees.read().unwrap_or_else(PoisonError::into_inner);
        trees.get(&locale).cloned().unwrap_or_default()
    }

    /// Install a tree directly, bypassing the filesystem.
    pub fn insert(&self, locale: Locale, tree: MessageTree) {
        let mut trees = self.inner.trees.write().unwrap_or_else(PoisonError::into_inner);
        trees.insert(locale, LoadState::Ready(Arc::new(tree)));
    }

    /// Load (or reload) the message tree for `locale`.
    ///
    /// A failed reload leaves an already loaded tree in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    #[instrument(skip(self), fields(locale = %locale))]
    pub async fn load(&self, locale: Locale) -> Result<(), I18nError> {
        let path = self.inner.dir.join(format!("{}.json", locale.code()));

        match read_tree(locale, &path).await {
            Ok(tree) => {
                self.insert(locale, tree);
                info!(path = %path.display(), "Loaded locale messages");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load locale messages");
                let mut trees = self.inner.trees.write().unwrap_or_else(PoisonError::into_inner);
                trees.entry(locale).or_default().fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Load every supported locale, logging failures.
    pub async fn load_all(&self) {
        for locale in SUPPORTED_LOCALES {
            if let Err(e) = self.load(*locale).await {
                tracing::error!(locale = %locale, error = %e, "Locale unavailable");
            }
        }
    }

    /// Load `locale` in the background unless it is already loaded.
    pub fn ensure_loaded(&self, locale: Locale) {
        if self.state(locale).is_ready() {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move {
            // Failures are recorded in the load state.
            let _ = this.load(locale).await;
        });
    }

    /// Translator bound to `locale`.
    ///
    /// A locale whose tree failed to load borrows the fallback locale's tree.
    #[must_use]
    pub fn translator(&self, locale: Locale) -> Translator {
        let primary = self.state(locale);
        let fallback = if locale != self.inner.fallback && primary.error().is_some() {
            self.state(self.inner.fallback).ready().cloned()
        } else {
            None
        };

        Translator {
            locale,
            primary: primary.ready().cloned(),
            fallback,
        }
    }

    /// Translate a single key.
    #[must_use]
    pub fn t(&self, locale: Locale, key: &str) -> String {
        self.translator(locale).t(key)
    }
}

async fn read_tree(locale: Locale, path: &Path) -> Result<MessageTree, I18nError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| I18nError::Io { locale, source })?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|source| I18nError::Parse { locale, source })?;
    MessageTree::from_value(value).map_err(|_| I18nError::NotAnObject(locale))
}

/// Snapshot of the trees needed to translate into one locale.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    primary: Option<Arc<MessageTree>>,
    fallback: Option<Arc<MessageTree>>,
}

impl Translator {
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether a message tree is available for lookups.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// The tree lookups are served from.
    #[must_use]
    pub fn messages(&self) -> Option<&MessageTree> {
        self.primary.as_deref().or(self.fallback.as_deref())
    }

    /// Resolve `key`, returning the key itself when it cannot be resolved.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        if let Some(text) = self.messages().and_then(|tree| tree.lookup(key)) {
            return text.to_string();
        }

        if self.is_loaded() {
            warn!(key, locale = %self.locale, "Translation not found");
        } else {
            debug!(key, locale = %self.locale, "Messages not loaded yet");
        }
        key.to_string()
    }
}
