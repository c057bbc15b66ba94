use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::instrument;

use crate::{
    config::Config,
    db::BookStore,
    error::AppResult,
    models::{BookInteractionRecord, LookupMode, Recommendation},
};

/// Creates a PostgreSQL connection pool
///
/// The pool is built once at start-up and shared by every request.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let (host, port) = config.store_endpoint()?;
    let options = PgConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&config.store_user)
        .password(&config.store_password)
        .database(&config.store_database);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const RECORD_COLUMNS: &str = "isbn, book_title, book_author, year_of_publication, publisher, \
    image_url_s, image_url_m, image_url_l, book_rating::float8 AS book_rating, \
    user_id, location, age";

/// Warehouse-backed book store
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
    lookup_by_isbn: String,
    lookup_by_title: String,
    recommend: String,
}

impl PgBookStore {
    /// `relation` must already be validated as `schema.table`
    pub fn new(pool: PgPool, relation: &str) -> Self {
        Self {
            pool,
            lookup_by_isbn: lookup_by_isbn_sql(relation),
            lookup_by_title: lookup_by_title_sql(relation),
            recommend: recommend_sql(relation),
        }
    }
}

fn lookup_by_isbn_sql(relation: &str) -> String {
    format!("SELECT {RECORD_COLUMNS} FROM {relation} WHERE isbn = $1")
}

fn lookup_by_title_sql(relation: &str) -> String {
    format!(
        "SELECT {RECORD_COLUMNS} FROM {relation} \
         WHERE book_title ILIKE '%' || $1 || '%' ESCAPE '\\' \
         ORDER BY year_of_publication DESC NULLS LAST, isbn ASC"
    )
}

fn recommend_sql(relation: &str) -> String {
    format!(
        r#"
        WITH seed_cohort AS (
            SELECT DISTINCT user_id, location, age
            FROM {relation}
            WHERE isbn = $1
        ),
        similar_users AS (
            SELECT DISTINCT b.user_id
            FROM {relation} b
            JOIN seed_cohort s
              ON b.location = s.location
             AND ABS(b.age - s.age) <= $2
            WHERE b.isbn <> $1
        )
        SELECT
            b.isbn,
            b.book_title,
            b.book_author,
            b.publisher,
            b.image_url_s,
            AVG(b.book_rating)::float8 AS avg_rating,
            COUNT(DISTINCT b.user_id) AS user_count
        FROM {relation} b
        JOIN similar_users su ON b.user_id = su.user_id
        WHERE b.isbn <> $1
        GROUP BY b.isbn, b.book_title, b.book_author, b.publisher, b.image_url_s
        ORDER BY user_count DESC, avg_rating DESC, b.isbn ASC
        LIMIT $3
        "#
    )
}

/// Escapes `LIKE` wildcards so a title fragment matches literally
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait::async_trait]
impl BookStore for PgBookStore {
    #[instrument(skip(self), fields(store = "postgres"))]
    async fn lookup(
        &self,
        identifier: &str,
        mode: LookupMode,
    ) -> AppResult<Vec<BookInteractionRecord>> {
        let rows = match mode {
            LookupMode::Isbn => {
                sqlx::query_as::<_, BookInteractionRecord>(&self.lookup_by_isbn)
                    .bind(identifier)
                    .fetch_all(&self.pool)
                    .await?
            }
            LookupMode::Title => {
                sqlx::query_as::<_, BookInteractionRecord>(&self.lookup_by_title)
                    .bind(escape_like(identifier))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        tracing::debug!(row_count = rows.len(), "Lookup query returned");
        Ok(rows)
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn recommend(
        &self,
        isbn: &str,
        age_tolerance: i32,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, Recommendation>(&self.recommend)
            .bind(isbn)
            .bind(age_tolerance)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(row_count = rows.len(), "Recommendation query returned");
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
