use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{BookLookup, LookupMode},
    routes::AppState,
    services::lookup::lookup_book,
};

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    q: String,
    #[serde(default)]
    mode: LookupMode,
}

/// Handler for book lookup endpoint
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LookupQuery>,
) -> AppResult<Json<BookLookup>> {
    tracing::info!(request_id = %request_id, mode = %params.mode, "Processing lookup request");

    let result = lookup_book(state.store.as_ref(), &params.q, params.mode).await?;
    Ok(Json(result))
}
