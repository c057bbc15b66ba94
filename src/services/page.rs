use crate::{
    db::{BookStore, MAX_RECOMMENDATIONS},
    error::{AppError, AppResult},
    models::{BookLookup, DisplayBlock, LookupMode, Page, RecommendationSet, SearchRequest},
    services::{lookup::lookup_book, recommendations::get_recommendations},
};

pub const PAGE_TITLE: &str = "Book Recommendation System";
const COVER_WIDTH: u32 = 150;
const THUMBNAIL_WIDTH: u32 = 120;
const NO_RECOMMENDATIONS: &str = "No personalized recommendations found. Try another book.";

/// Runs one search action: lookup, then recommendations if the book exists.
///
/// A missing book renders as an error banner. A lookup store fault still
/// aborts the request.
pub async fn search_page(store: &dyn BookStore, request: &SearchRequest) -> AppResult<Page> {
    let lookup = match lookup_book(store, &request.query, request.mode).await {
        Ok(lookup) => lookup,
        Err(AppError::NotFound(_)) => return Ok(not_found_page(request.mode)),
        Err(e) => return Err(e),
    };

    let recommendations = get_recommendations(store, &lookup.book.isbn).await;
    Ok(render_page(&lookup, &recommendations))
}

fn not_found_page(mode: LookupMode) -> Page {
    let message = match mode {
        LookupMode::Isbn => "Book not found. Please enter a valid ISBN.",
        LookupMode::Title => "Book not found. Please enter a valid ISBN or title.",
    };
    let mut page = Page::new(PAGE_TITLE);
    page.push(DisplayBlock::Error {
        message: message.to_string(),
    });
    page
}

pub fn render_page(lookup: &BookLookup, set: &RecommendationSet) -> Page {
    let book = &lookup.book;
    let mut page = Page::new(PAGE_TITLE);

    page.push(DisplayBlock::Image {
        url: book.image_url_m.clone(),
        width: COVER_WIDTH,
    });
    page.push(DisplayBlock::Heading {
        text: book.book_title.clone(),
    });
    page.push(DisplayBlock::field("Author", &book.book_author));
    page.push(DisplayBlock::field("Publisher", &book.publisher));
    page.push(DisplayBlock::field("Rating", book.book_rating));
    if lookup.matching_isbns > 1 {
        page.push(DisplayBlock::field("Other matching books", lookup.matching_isbns - 1));
    }
    page.push(DisplayBlock::Divider);

    if let Some(warning) = &set.warning {
        page.push(DisplayBlock::Error {
            message: warning.clone(),
        });
    }

    if set.recommendations.is_empty() {
        page.push(DisplayBlock::Warning {
            message: NO_RECOMMENDATIONS.to_string(),
        });
        return page;
    }

    page.push(DisplayBlock::Heading {
        text: format!("Top {} Recommended Books", MAX_RECOMMENDATIONS),
    });
    for rec in &set.recommendations {
        page.push(DisplayBlock::Expander {
            title: format!("{} by {}", rec.book_title, rec.book_author),
            blocks: vec![
                DisplayBlock::Image {
                    url: rec.image_url_s.clone(),
                    width: THUMBNAIL_WIDTH,
                },
                DisplayBlock::field("Publisher", &rec.publisher),
                DisplayBlock::field("Average Rating", format!("{:.2}", rec.avg_rating)),
            ],
        });
    }

    page
}
