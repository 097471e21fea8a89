//! CyborgTech Storefront library.
//!
//! This crate provides the storefront service as a library, allowing it to
//! be tested and reused:
//! - `catalog` - Catalog API client and in-memory snapshots
//! - `i18n` - Locale message trees and translation
//! - `design` - Design token lookups
//! - `checkout` - Order summary and WhatsApp handoff
//! - `routes` / `app` - The HTTP surface

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod design;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use app::build_router;
