//! Active locale resolution.
//!
//! The locale of a request is, in order: the preference stored in the
//! session, the best supported match from `Accept-Language`, and finally the
//! configured default locale.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header::ACCEPT_LANGUAGE, request::Parts};
use cyborgtech_core::Locale;
use tower_sessions::Session;

use crate::models::session_keys;
use crate::state::AppState;

/// Extractor for the locale the response should be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>()
            && let Some(locale) = session
                .get::<Locale>(session_keys::LOCALE)
                .await
                .ok()
                .flatten()
        {
            return Ok(Self(locale));
        }

        let detected = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::from_accept_language);

        Ok(Self(detected.unwrap_or(state.config().default_locale)))
    }
}

/// Persist the visitor's locale preference in the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_locale(
    session: &Session,
    locale: Locale,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::LOCALE, locale).await
}
