//! Session-backed cart extractor.
//!
//! The cart is stored in the session as a JSON snapshot. Handlers mutate the
//! extracted [`Cart`] and write it back with [`SessionCart::save`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cyborgtech_core::Cart;
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;
use crate::models::session_keys;

/// The visitor's cart, loaded from the session.
pub struct SessionCart {
    session: Session,
    cart: Cart,
}

impl SessionCart {
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Write the cart back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session.insert(session_keys::CART, &self.cart).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        // An unreadable snapshot starts a fresh cart rather than failing the request.
        let cart = match session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart snapshot");
                Cart::new()
            }
        };

        Ok(Self { session, cart })
    }
}
