use std::collections::HashSet;

use crate::{
    db::BookStore,
    error::{AppError, AppResult},
    models::{BookInteractionRecord, BookLookup, LookupMode, MAX_ISBN_LEN},
};

/// Resolves a user-supplied identifier to one canonical book record.
///
/// Store faults are not caught here: a failed lookup aborts the request and
/// surfaces as a store error. Only the recommendation runner degrades to an
/// empty result.
pub async fn lookup_book(
    store: &dyn BookStore,
    identifier: &str,
    mode: LookupMode,
) -> AppResult<BookLookup> {
    let identifier = normalize_identifier(identifier, mode)?;

    tracing::info!(identifier = %identifier, mode = %mode, store = store.name(), "Looking up book");

    let rows = store.lookup(&identifier, mode).await?;
    let matching_isbns = rows.iter().map(|r| r.isbn.as_str()).collect::<HashSet<_>>().len();

    let book = select_canonical(rows, mode)
        .ok_or_else(|| AppError::NotFound(format!("No book matches {} {:?}", mode, identifier)))?;

    if matching_isbns > 1 {
        tracing::info!(
            matching_isbns,
            chosen = %book.isbn,
            "Title matched several books, picked newest edition"
        );
    }

    Ok(BookLookup {
        book,
        matching_isbns,
    })
}

/// Trims the identifier and enforces the per-mode input rules
pub fn normalize_identifier(identifier: &str, mode: LookupMode) -> AppResult<String> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::InvalidInput(
            "Enter an ISBN or a title to search for".to_string(),
        ));
    }
    if mode == LookupMode::Isbn && identifier.chars().count() > MAX_ISBN_LEN {
        return Err(AppError::InvalidInput(format!(
            "ISBN must be at most {} characters",
            MAX_ISBN_LEN
        )));
    }
    Ok(identifier.to_string())
}

/// Picks the canonical record among the rows a lookup returned.
///
/// ISBN rows all describe the same book, so the first is used. Title rows may
/// span several books; the newest publication year wins, then the lowest ISBN,
/// independent of the order the store returned them in.
fn select_canonical(
    rows: Vec<BookInteractionRecord>,
    mode: LookupMode,
) -> Option<BookInteractionRecord> {
    match mode {
        LookupMode::Isbn => rows.into_iter().next(),
        LookupMode::Title => rows.into_iter().reduce(|best, row| {
            let newer = row.year_of_publication > best.year_of_publication;
            let same_year_lower_isbn =
                row.year_of_publication == best.year_of_publication && row.isbn < best.isbn;
            if newer || same_year_lower_isbn {
                row
            } else {
                best
            }
        }),
    }
}
