//! Locale route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use cyborgtech_core::Locale;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{RequestLocale, set_locale};
use crate::state::AppState;

/// Message tree of the active locale.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub locale: Locale,
    pub status: &'static str,
    /// `null` until a tree is available.
    pub messages: Option<serde_json::Value>,
}

/// Translate query parameters.
#[derive(Debug, Deserialize)]
pub struct TranslateQuery {
    pub key: String,
}

/// A single translation.
#[derive(Debug, Serialize)]
pub struct Translation {
    pub locale: Locale,
    pub key: String,
    pub value: String,
}

/// Locale change request.
#[derive(Debug, Deserialize)]
pub struct SetLocaleRequest {
    pub locale: String,
}

/// Locale change result.
#[derive(Debug, Serialize)]
pub struct LocaleResponse {
    pub locale: Locale,
    pub status: &'static str,
}

/// Messages for the active locale.
#[instrument(skip(state))]
pub async fn messages(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<MessagesResponse> {
    let translator = state.i18n().translator(locale);

    Json(MessagesResponse {
        locale,
        status: state.i18n().state(locale).status(),
        messages: translator.messages().map(|tree| tree.as_value().clone()),
    })
}

/// Translate one key; unknown keys come back unchanged.
#[instrument(skip(state))]
pub async fn translate(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<TranslateQuery>,
) -> Json<Translation> {
    let value = state.i18n().t(locale, &query.key);

    Json(Translation {
        locale,
        key: query.key,
        value,
    })
}

/// Switch the visitor's locale and make sure its messages are loading.
#[instrument(skip(state, session))]
pub async fn change_locale(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SetLocaleRequest>,
) -> Result<Json<LocaleResponse>> {
    let locale = Locale::parse(&request.locale)
        .ok_or_else(|| AppError::BadRequest(format!("unsupported locale: {}", request.locale)))?;

    set_locale(&session, locale).await?;
    state.i18n().ensure_loaded(locale);

    Ok(Json(LocaleResponse {
        locale,
        status: state.i18n().state(locale).status(),
    }))
}
