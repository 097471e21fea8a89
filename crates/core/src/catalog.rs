//! Catalog filter engine.
//!
//! [`compute_view`] turns a product snapshot plus the visitor's
//! [`FilterState`] into one page of results. The pipeline runs in a fixed
//! order: category, subcategory, offers-only, search, sort, paginate.
//!
//! The engine never mutates its input and holds no state, so identical
//! arguments always produce an identical view.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::types::{Locale, Price, Product};

/// A category or subcategory selector.
///
/// `"all"` (any case) and the empty string both mean "unrestricted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    /// Whether `value` passes this selector.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        match selector {
            Selector::All => "all".to_string(),
            Selector::Only(value) => value,
        }
    }
}

/// Sort order of a catalog view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Localized name, case-insensitive.
    #[default]
    Name,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price_low" => Ok(Self::PriceLow),
            "price_high" => Ok(Self::PriceHigh),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// The visitor's catalog view parameters.
///
/// Setters keep the reset rules: a new category clears the subcategory and
/// returns to page 1, and any other filter change returns to page 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    category: Selector,
    subcategory: Selector,
    search: String,
    sort: SortKey,
    offers_only: bool,
    page: i64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: Selector::All,
            subcategory: Selector::All,
            search: String::new(),
            sort: SortKey::Name,
            offers_only: false,
            page: 1,
        }
    }
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn category(&self) -> &Selector {
        &self.category
    }

    #[must_use]
    pub const fn subcategory(&self) -> &Selector {
        &self.subcategory
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    #[must_use]
    pub const fn offers_only(&self) -> bool {
        self.offers_only
    }

    /// Requested page; may be out of range until a view clamps it.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Change the category, resetting subcategory and page.
    pub fn set_category(&mut self, category: impl Into<Selector>) {
        self.category = category.into();
        self.subcategory = Selector::All;
        self.page = 1;
    }

    pub fn set_subcategory(&mut self, subcategory: impl Into<Selector>) {
        self.subcategory = subcategory.into();
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_offers_only(&mut self, offers_only: bool) {
        self.offers_only = offers_only;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = page;
    }

    /// Builder-style page change.
    #[must_use]
    pub const fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
}

/// One page of a filtered, sorted catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView<'a> {
    /// Products on the current page.
    pub items: Vec<&'a Product>,
    /// The page actually shown, after clamping (1-based).
    pub page: usize,
    /// Number of pages; at least 1 even when nothing matched.
    pub total_pages: usize,
    /// Number of products that passed every filter.
    pub total_count: usize,
}

/// Compute the catalog view for `filter`.
///
/// Search matches the localized name and description (active `locale`,
/// falling back to `fallback`) case-insensitively. Products whose price
/// failed to parse sort after every priced product in both price orders.
/// A `page_size` of zero is treated as one.
#[must_use]
pub fn compute_view<'a>(
    products: &'a [Product],
    filter: &FilterState,
    locale: Locale,
    fallback: Locale,
    page_size: usize,
) -> CatalogView<'a> {
    let page_size = page_size.max(1);
    let term = filter.search.trim().to_lowercase();

    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|product| filter.category.matches(&product.category))
        .filter(|product| filter.subcategory.matches(&product.subcategory))
        .filter(|product| !filter.offers_only || product.is_offer)
        .filter(|product| term.is_empty() || matches_search(product, &term, locale, fallback))
        .collect();

    match filter.sort {
        SortKey::Name => {
            let mut keyed: Vec<((String, String), &Product)> = matched
                .into_iter()
                .map(|product| (name_sort_key(product.display_name(locale, fallback)), product))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            matched = keyed.into_iter().map(|(_, product)| product).collect();
        }
        SortKey::PriceLow => matched.sort_by(|a, b| compare_prices(a.price, b.price, false)),
        SortKey::PriceHigh => matched.sort_by(|a, b| compare_prices(a.price, b.price, true)),
    }

    let total_count = matched.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page = clamp_page(filter.page, total_pages);

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    CatalogView {
        items,
        page,
        total_pages,
        total_count,
    }
}

/// Distinct subcategories of `category`, in first-seen order.
///
/// Returns nothing for [`Selector::All`], since subcategories are only
/// offered once a category is chosen.
#[must_use]
pub fn available_subcategories<'a>(products: &'a [Product], category: &Selector) -> Vec<&'a str> {
    if category.is_all() {
        return Vec::new();
    }

    let mut seen: Vec<&str> = Vec::new();
    for product in products.iter().filter(|p| category.matches(&p.category)) {
        let subcategory = product.subcategory.as_str();
        if !subcategory.is_empty() && !seen.contains(&subcategory) {
            seen.push(subcategory);
        }
    }
    seen
}

fn matches_search(product: &Product, term: &str, locale: Locale, fallback: Locale) -> bool {
    product
        .display_name(locale, fallback)
        .to_lowercase()
        .contains(term)
        || product
            .display_description(locale, fallback)
            .to_lowercase()
            .contains(term)
}

/// Names compare without case or accents, so "Éter" sorts among the e's.
/// The lowercased original breaks ties between names that fold alike.
fn name_sort_key(name: &str) -> (String, String) {
    let folded = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    (folded, name.to_lowercase())
}

/// Unparseable prices always order last.
fn compare_prices(a: Option<Price>, b: Option<Price>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn clamp_page(requested: i64, total_pages: usize) -> usize {
    usize::try_from(requested.max(1))
        .unwrap_or(usize::MAX)
        .min(total_pages)
}
