//! Session keys.
//!
//! The cart and the locale preference are the only state the storefront
//! keeps per visitor; both live in the session store.

/// Session keys for visitor state.
pub mod keys {
    /// Key for the serialized cart snapshot.
    pub const CART: &str = "cart";

    /// Key for the visitor's locale preference.
    pub const LOCALE: &str = "cyborgtech_lang";
}
