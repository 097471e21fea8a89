//! Design token lookups.
//!
//! Tokens come from `<content_dir>/design-system.json`:
//!
//! ```json
//! {
//!   "colors": { "primary": { "500": "#00f0ff" } },
//!   "typography": { "fontSize": { "lg": "1.125rem" } },
//!   "spacing": { "4": "1rem" },
//!   "borderRadius": { "md": "0.375rem" },
//!   "shadows": { "neon": "0 0 10px #00f0ff" },
//!   "components": { "button": { "primary": { "background": "..." } } }
//! }
//! ```
//!
//! Every accessor is total: unknown paths resolve to `""` (or `{}` for
//! component styles) so a missing token never breaks rendering.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use cyborgtech_core::LoadState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading the token file.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("failed to read design tokens: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse design tokens: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("design tokens must be a JSON object")]
    NotAnObject,
}

/// Typography token group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypographyKind {
    FontSize,
    FontWeight,
    LineHeight,
}

impl TypographyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::LineHeight => "lineHeight",
        }
    }
}

impl FromStr for TypographyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fontSize" | "font_size" => Ok(Self::FontSize),
            "fontWeight" | "font_weight" => Ok(Self::FontWeight),
            "lineHeight" | "line_height" => Ok(Self::LineHeight),
            other => Err(format!("unknown typography kind: {other}")),
        }
    }
}

/// The design token document.
#[derive(Clone, Default)]
pub struct DesignTokens {
    inner: Arc<RwLock<LoadState<Arc<Value>>>>,
}

impl DesignTokens {
    /// Tokens that have not been loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns `DesignError::NotAnObject` if `document` is not an object.
    pub fn from_value(document: Value) -> Result<Self, DesignError> {
        let tokens = Self::new();
        tokens.install(document)?;
        Ok(tokens)
    }

    fn install(&self, document: Value) -> Result<(), DesignError> {
        if !document.is_object() {
            return Err(DesignError::NotAnObject);
        }
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *state = LoadState::Ready(Arc::new(document));
        Ok(())
    }

    /// Load (or reload) tokens from `path`.
    ///
    /// A failed reload keeps previously loaded tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(&self, path: &Path) -> Result<(), DesignError> {
        let result = read_document(path)
            .await
            .and_then(|document| self.install(document));

        match &result {
            Ok(()) => info!(path = %path.display(), "Loaded design tokens"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load design tokens");
                let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
                state.fail(e.to_string());
            }
        }
        result
    }

    /// Current load state.
    #[must_use]
    pub fn state(&self) -> LoadState<Arc<Value>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn document(&self) -> Option<Arc<Value>> {
        self.state().ready().cloned()
    }

    /// String token at `section.<segments...>`, `""` if absent.
    fn string_at(&self, section: &str, segments: &[&str]) -> String {
        let Some(document) = self.document() else {
            return String::new();
        };
        let mut node = document.get(section);
        for segment in segments {
            node = node.and_then(|n| n.get(*segment));
        }

        match node {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Color at a dotted path under `colors`, e.g. `"primary.500"`.
    #[must_use]
    pub fn color(&self, path: &str) -> String {
        let segments: Vec<&str> = path.split('.').collect();
        self.string_at("colors", &segments)
    }

    /// Typography token, e.g. `(FontSize, "lg")`.
    #[must_use]
    pub fn typography(&self, kind: TypographyKind, size: &str) -> String {
        self.string_at("typography", &[kind.as_str(), size])
    }

    /// Spacing token. Keys such as `"0.5"` are looked up literally.
    #[must_use]
    pub fn spacing(&self, size: &str) -> String {
        self.string_at("spacing", &[size])
    }

    #[must_use]
    pub fn border_radius(&self, size: &str) -> String {
        self.string_at("borderRadius", &[size])
    }

    #[must_use]
    pub fn shadow(&self, size: &str) -> String {
        self.string_at("shadows", &[size])
    }

    /// Style object of a component, or of one of its variants.
    #[must_use]
    pub fn component_style(&self, component: &str, variant: Option<&str>) -> Value {
        let style = self.document().and_then(|document| {
            let base = document.get("components")?.get(component)?;
            let node = match variant {
                Some(variant) => base.get(variant)?,
                None => base,
            };
            node.is_object().then(|| node.clone())
        });

        style.unwrap_or_else(|| Value::Object(Map::new()))
    }
}

async fn read_document(path: &Path) -> Result<Value, DesignError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}
