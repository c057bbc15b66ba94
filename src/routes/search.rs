use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Page, SearchRequest},
    routes::AppState,
    services::page,
};

/// Handler for the search action: lookup followed by recommendations
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<Page>> {
    tracing::info!(
        request_id = %request_id,
        mode = %request.mode,
        "Processing search request"
    );

    let page = page::search_page(state.store.as_ref(), &request).await?;

    tracing::info!(request_id = %request_id, blocks = page.blocks.len(), "Search completed");

    Ok(Json(page))
}
