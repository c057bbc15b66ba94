use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    middleware::request_id::RequestId, models::RecommendationSet, routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
///
/// Always answers 200; a failed store query shows up as `warning`.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(isbn): Path<String>,
) -> Json<RecommendationSet> {
    tracing::info!(request_id = %request_id, isbn = %isbn, "Processing recommendation request");

    let set = recommendations::get_recommendations(state.store.as_ref(), isbn.trim()).await;
    Json(set)
}
