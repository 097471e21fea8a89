//! Supported locales and localized text.
//!
//! Product names and descriptions arrive as maps keyed by locale code.
//! [`LocalizedText::resolve`] is the one place where the "active locale,
//! then fallback locale" chain is applied.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a locale code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0:?}")]
pub struct LocaleError(pub String);

/// Storefront locales.
///
/// [`Locale::Es`] is the shop's home locale and the default fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
    Fr,
}

/// Every supported locale, in presentation order.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::Es, Locale::En, Locale::Fr];

impl Locale {
    /// Two-letter locale code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Parse a language tag, tolerating case and region suffixes
    /// (`"en-US"`, `"FR_ca"`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    /// Pick the preferred supported locale from an `Accept-Language` value.
    ///
    /// Entries are ranked by their `q` weight (default 1.0, ties keep header
    /// order). Returns `None` when no entry names a supported language.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, usize, Self)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let locale = Self::parse(parts.next()?)?;
                let weight = parts
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((weight, position, locale))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.first().map(|(_, _, locale)| *locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| LocaleError(s.to_string()))
    }
}

/// Text translated into several locales, keyed by locale code.
///
/// Unknown codes are preserved so records round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Create an empty text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one translation.
    #[must_use]
    pub fn with(mut self, locale: Locale, text: impl Into<String>) -> Self {
        self.0.insert(locale.code().to_string(), text.into());
        self
    }

    /// The translation for exactly `locale`, if present and non-empty.
    #[must_use]
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0
            .get(locale.code())
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    /// Resolve for `locale`, falling back to `fallback`, then to `""`.
    #[must_use]
    pub fn resolve(&self, locale: Locale, fallback: Locale) -> &str {
        self.get(locale)
            .or_else(|| self.get(fallback))
            .unwrap_or_default()
    }

    /// Whether no translation is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_region_and_case() {
        assert_eq!(Locale::parse("en-US"), Some(Locale::En));
        assert_eq!(Locale::parse("FR_ca"), Some(Locale::Fr));
        assert_eq!(Locale::parse(" es "), Some(Locale::Es));
        assert_eq!(Locale::parse("de"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn test_accept_language_uses_weights() {
        assert_eq!(
            Locale::from_accept_language("de-DE,de;q=0.9,fr;q=0.5,en;q=0.8"),
            Some(Locale::En)
        );
    }

    #[test]
    fn test_accept_language_keeps_header_order_on_ties() {
        assert_eq!(Locale::from_accept_language("fr, en"), Some(Locale::Fr));
    }

    #[test]
    fn test_accept_language_inconclusive() {
        assert_eq!(Locale::from_accept_language("de, it;q=0.7"), None);
        assert_eq!(Locale::from_accept_language("en;q=0"), None);
        assert_eq!(Locale::from_accept_language(""), None);
    }

    #[test]
    fn test_resolve_falls_back_to_fallback_locale() {
        let text = LocalizedText::new()
            .with(Locale::Es, "Teclado")
            .with(Locale::En, "");
        assert_eq!(text.resolve(Locale::En, Locale::Es), "Teclado");
        assert_eq!(text.resolve(Locale::Es, Locale::En), "Teclado");
    }

    #[test]
    fn test_resolve_missing_everywhere_is_empty() {
        let text = LocalizedText::new().with(Locale::Fr, "Clavier");
        assert_eq!(text.resolve(Locale::En, Locale::Es), "");
    }

    #[test]
    fn test_localized_text_deserializes_from_plain_map() {
        let text: LocalizedText =
            serde_json::from_str(r#"{"es":"Ratón","en":"Mouse","fr":"Souris"}"#)
                .unwrap_or_default();
        assert_eq!(text.get(Locale::En), Some("Mouse"));
    }
}
