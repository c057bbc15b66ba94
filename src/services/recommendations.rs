use crate::{
    db::{BookStore, AGE_TOLERANCE, MAX_RECOMMENDATIONS},
    models::RecommendationSet,
};

/// Recommends books read by users similar to the readers of `isbn`.
///
/// Similar users share a reader's location exactly and are within
/// [`AGE_TOLERANCE`] years of that reader's age. Candidates are ranked by
/// distinct cohort readers, then average rating, and capped at
/// [`MAX_RECOMMENDATIONS`]. There is no popular-books fallback: an unread seed
/// or an empty cohort yields an empty set.
///
/// A store fault is absorbed here and reported through
/// [`RecommendationSet::warning`] with an empty list.
pub async fn get_recommendations(store: &dyn BookStore, isbn: &str) -> RecommendationSet {
    match store.recommend(isbn, AGE_TOLERANCE, MAX_RECOMMENDATIONS).await {
        Ok(recommendations) => {
            tracing::info!(
                isbn = %isbn,
                count = recommendations.len(),
                "Recommendations computed"
            );
            RecommendationSet {
                recommendations,
                warning: None,
            }
        }
        Err(e) => {
            tracing::warn!(isbn = %isbn, store = store.name(), error = %e, "Recommendation query failed");
            RecommendationSet {
                recommendations: Vec::new(),
                warning: Some(format!("Error while fetching recommendations: {}", e)),
            }
        }
    }
}
