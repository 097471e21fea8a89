//! Design token route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cyborgtech_core::LoadState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::design::{DesignTokens, TypographyKind};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Token lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    /// `color`, `spacing`, `borderRadius`, `shadow`, or a typography kind
    /// (`fontSize`, `fontWeight`, `lineHeight`).
    pub group: String,
    pub key: String,
}

/// A resolved token; `value` is empty when the token does not exist.
#[derive(Debug, Serialize)]
pub struct TokenValue {
    pub group: String,
    pub key: String,
    pub value: String,
}

/// Component style query parameters.
#[derive(Debug, Deserialize)]
pub struct ComponentQuery {
    pub variant: Option<String>,
}

fn resolve(tokens: &DesignTokens, group: &str, key: &str) -> Result<String> {
    let value = match group {
        "color" | "colors" => tokens.color(key),
        "spacing" => tokens.spacing(key),
        "borderRadius" | "border_radius" => tokens.border_radius(key),
        "shadow" | "shadows" => tokens.shadow(key),
        other => {
            let kind: TypographyKind = other.parse().map_err(AppError::BadRequest)?;
            tokens.typography(kind, key)
        }
    };
    Ok(value)
}

/// The full token document.
#[instrument(skip(state))]
pub async fn tokens(State(state): State<AppState>) -> Result<Json<Value>> {
    match state.design().state() {
        LoadState::Ready(document) => Ok(Json(document.as_ref().clone())),
        LoadState::Loading => Err(AppError::Unavailable(
            "design tokens are loading".to_string(),
        )),
        LoadState::Failed(message) => Err(AppError::Unavailable(format!(
            "design tokens unavailable: {message}"
        ))),
    }
}

/// One token value.
#[instrument(skip(state))]
pub async fn token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenValue>> {
    let value = resolve(state.design(), &query.group, &query.key)?;
    Ok(Json(TokenValue {
        group: query.group,
        key: query.key,
        value,
    }))
}

/// Style object of a component (and optional variant); `{}` if unknown.
#[instrument(skip(state))]
pub async fn component(
    State(state): State<AppState>,
    Path(component): Path<String>,
    Query(query): Query<ComponentQuery>,
) -> Json<Value> {
    Json(
        state
            .design()
            .component_style(&component, query.variant.as_deref()),
    )
}
