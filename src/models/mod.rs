use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod book;
pub mod page;

pub use book::{BookInteractionRecord, Recommendation};
pub use page::{DisplayBlock, Page};

/// Longest identifier accepted in ISBN mode (ISBN-13)
pub const MAX_ISBN_LEN: usize = 13;

/// How a lookup identifier is matched against the books relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Exact ISBN match
    #[default]
    Isbn,
    /// Case-insensitive substring match on the title
    Title,
}

impl Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMode::Isbn => write!(f, "isbn"),
            LookupMode::Title => write!(f, "title"),
        }
    }
}

/// The single text input plus its resolution mode
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub mode: LookupMode,
}

/// Resolved book identity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookLookup {
    /// Canonical record for the matched book
    pub book: BookInteractionRecord,
    /// Distinct ISBNs that matched the identifier
    pub matching_isbns: usize,
}

/// Outcome of the recommendation runner
///
/// `warning` is set when the store failed and `recommendations` is empty as a
/// consequence, so API callers can tell a failure from an empty cohort.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
