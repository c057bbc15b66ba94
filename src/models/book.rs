use serde::{Deserialize, Serialize};

/// One (user, book) interaction row of the denormalized books relation.
///
/// Book metadata is repeated on every interaction row for the same ISBN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BookInteractionRecord {
    pub isbn: String,
    pub book_title: String,
    pub book_author: String,
    pub year_of_publication: Option<i32>,
    pub publisher: String,
    pub image_url_s: String,
    pub image_url_m: String,
    pub image_url_l: String,
    pub book_rating: f64,
    pub user_id: i64,
    pub location: String,
    pub age: Option<i32>,
}

/// A book read by the similarity cohort, ranked for recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Recommendation {
    pub isbn: String,
    pub book_title: String,
    pub book_author: String,
    pub publisher: String,
    pub image_url_s: String,
    /// Average rating over the cohort's interactions with this book
    pub avg_rating: f64,
    /// Distinct cohort users who interacted with this book
    pub user_count: i64,
}
