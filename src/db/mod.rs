use crate::{
    error::AppResult,
    models::{BookInteractionRecord, LookupMode, Recommendation},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBookStore;
pub use postgres::{create_pool, PgBookStore};

/// Largest absolute age gap between a seed reader and a similar user
pub const AGE_TOLERANCE: i32 = 5;

/// Most recommendations returned for one seed book
pub const MAX_RECOMMENDATIONS: i64 = 5;

/// Read-only access to the denormalized book interaction relation.
///
/// Both query runners go through this trait so they can run against the
/// warehouse or a substitute store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BookStore: Send + Sync {
    /// Returns every interaction row matching `identifier` under `mode`
    async fn lookup(
        &self,
        identifier: &str,
        mode: LookupMode,
    ) -> AppResult<Vec<BookInteractionRecord>>;

    /// Ranks books read by users similar to the readers of `isbn`
    async fn recommend(
        &self,
        isbn: &str,
        age_tolerance: i32,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
