use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::{
    db::BookStore,
    error::AppResult,
    models::{BookInteractionRecord, LookupMode, Recommendation},
};

/// Book store over rows held in memory.
///
/// Evaluates the same seed / similarity / ranking stages as the warehouse
/// query, so handlers and services can be exercised without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookStore {
    rows: Vec<BookInteractionRecord>,
}

type GroupKey<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

#[derive(Default)]
struct Aggregate {
    rating_sum: f64,
    rating_count: usize,
    users: HashSet<i64>,
}

impl InMemoryBookStore {
    pub fn new(rows: Vec<BookInteractionRecord>) -> Self {
        Self { rows }
    }

    fn seed_cohort(&self, isbn: &str) -> HashSet<(i64, &str, Option<i32>)> {
        self.rows
            .iter()
            .filter(|row| row.isbn == isbn)
            .map(|row| (row.user_id, row.location.as_str(), row.age))
            .collect()
    }

    fn similar_users(
        &self,
        isbn: &str,
        seed: &HashSet<(i64, &str, Option<i32>)>,
        age_tolerance: i32,
    ) -> HashSet<i64> {
        self.rows
            .iter()
            .filter(|row| row.isbn != isbn)
            .filter(|row| {
                seed.iter().any(|(_, location, age)| {
                    row.location == *location && within_tolerance(row.age, *age, age_tolerance)
                })
            })
            .map(|row| row.user_id)
            .collect()
    }
}

/// Missing ages never match, like `ABS(NULL - x) <= n` in SQL
fn within_tolerance(candidate: Option<i32>, seed: Option<i32>, tolerance: i32) -> bool {
    match (candidate, seed) {
        (Some(a), Some(b)) => u32::try_from(tolerance).is_ok_and(|t| a.abs_diff(b) <= t),
        _ => false,
    }
}

fn rank(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.user_count
        .cmp(&a.user_count)
        .then_with(|| b.avg_rating.total_cmp(&a.avg_rating))
        .then_with(|| a.isbn.cmp(&b.isbn))
}

#[async_trait::async_trait]
impl BookStore for InMemoryBookStore {
    async fn lookup(
        &self,
        identifier: &str,
        mode: LookupMode,
    ) -> AppResult<Vec<BookInteractionRecord>> {
        let rows = match mode {
            LookupMode::Isbn => self
                .rows
                .iter()
                .filter(|row| row.isbn == identifier)
                .cloned()
                .collect(),
            LookupMode::Title => {
                let needle = identifier.to_lowercase();
                let mut rows: Vec<BookInteractionRecord> = self
                    .rows
                    .iter()
                    .filter(|row| row.book_title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                // Newest edition first, nulls last, then ISBN
                rows.sort_by(|a, b| {
                    b.year_of_publication
                        .cmp(&a.year_of_publication)
                        .then_with(|| a.isbn.cmp(&b.isbn))
                });
                rows
            }
        };
        Ok(rows)
    }

    async fn recommend(
        &self,
        isbn: &str,
        age_tolerance: i32,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        let seed = self.seed_cohort(isbn);
        if seed.is_empty() {
            return Ok(Vec::new());
        }

        let similar = self.similar_users(isbn, &seed, age_tolerance);
        if similar.is_empty() {
            return Ok(Vec::new());
        }

        let mut groups: HashMap<GroupKey<'_>, Aggregate> = HashMap::new();
        for row in self
            .rows
            .iter()
            .filter(|row| row.isbn != isbn && similar.contains(&row.user_id))
        {
            let key = (
                row.isbn.as_str(),
                row.book_title.as_str(),
                row.book_author.as_str(),
                row.publisher.as_str(),
                row.image_url_s.as_str(),
            );
            let group = groups.entry(key).or_default();
            group.rating_sum += row.book_rating;
            group.rating_count += 1;
            group.users.insert(row.user_id);
        }

        let mut ranked: Vec<Recommendation> = groups
            .into_iter()
            .map(
                |((isbn, book_title, book_author, publisher, image_url_s), group)| Recommendation {
                    isbn: isbn.to_string(),
                    book_title: book_title.to_string(),
                    book_author: book_author.to_string(),
                    publisher: publisher.to_string(),
                    image_url_s: image_url_s.to_string(),
                    avg_rating: group.rating_sum / group.rating_count as f64,
                    user_count: group.users.len() as i64,
                },
            )
            .collect();

        ranked.sort_by(rank);
        ranked.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
