//! Admin route handlers.
//!
//! Mutations are forwarded to the catalog API with the caller's bearer
//! token. On success the local snapshot is patched so visitors see the
//! change without waiting for the next refresh.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cyborgtech_core::{Collection, Product};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::catalog::refresh_collection;
use crate::error::Result;
use crate::middleware::AdminToken;
use crate::state::AppState;

/// Patch the snapshot with `product`, or refresh the whole collection when
/// the API did not echo the record.
async fn apply(state: &AppState, collection: Collection, product: Option<Product>) {
    match product {
        Some(product) => {
            state.catalog().upsert(product);
        }
        None => {
            if let Err(e) =
                refresh_collection(state.catalog_client(), state.catalog(), collection).await
            {
                warn!(collection = %collection, error = %e, "Refresh after admin change failed");
            }
        }
    }
}

/// Create a record.
#[instrument(skip(state, token, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    AdminToken(token): AdminToken,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Product>>)> {
    let created = state
        .catalog_client()
        .create(collection, &body, &token)
        .await?;

    apply(&state, collection, created.clone()).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a record.
#[instrument(skip(state, token, body))]
pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
    AdminToken(token): AdminToken,
    Json(body): Json<Value>,
) -> Result<Json<Option<Product>>> {
    let client = state.catalog_client();
    let updated = match client.update(collection, &id, &body, &token).await? {
        Some(product) => Some(product),
        None => client.fetch_product(collection, &id).await.ok(),
    };

    apply(&state, collection, updated.clone()).await;
    Ok(Json(updated))
}

/// Delete a record.
#[instrument(skip(state, token))]
pub async fn delete(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
    AdminToken(token): AdminToken,
) -> Result<StatusCode> {
    state
        .catalog_client()
        .delete(collection, &id, &token)
        .await?;

    state.catalog().remove(collection, &id);
    Ok(StatusCode::NO_CONTENT)
}
