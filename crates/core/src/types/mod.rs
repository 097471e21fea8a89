//! Core types for CyborgTech.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod load_state;
pub mod locale;
pub mod price;
pub mod product;

pub use id::ProductId;
pub use load_state::LoadState;
pub use locale::{Locale, LocaleError, LocalizedText, SUPPORTED_LOCALES};
pub use price::{Price, PriceError, format_amount};
pub use product::{BuildComponent, Collection, Product};
