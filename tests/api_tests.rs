use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use shelfmate_api::{
    db::{BookStore, InMemoryBookStore},
    error::{AppError, AppResult},
    models::{BookInteractionRecord, LookupMode, Recommendation},
    routes::{create_router, AppState},
};

fn row(
    isbn: &str,
    title: &str,
    year: Option<i32>,
    user_id: i64,
    location: &str,
    age: Option<i32>,
    rating: f64,
) -> BookInteractionRecord {
    BookInteractionRecord {
        isbn: isbn.to_string(),
        book_title: title.to_string(),
        book_author: format!("Author of {}", title),
        year_of_publication: year,
        publisher: "Penguin".to_string(),
        image_url_s: format!("http://images.example/{}-s.jpg", isbn),
        image_url_m: format!("http://images.example/{}-m.jpg", isbn),
        image_url_l: format!("http://images.example/{}-l.jpg", isbn),
        book_rating: rating,
        user_id,
        location: location.to_string(),
        age,
    }
}

fn library() -> Vec<BookInteractionRecord> {
    vec![
        row("0001", "Dune", Some(1965), 1, "NY", Some(30), 9.0),
        row("0002", "Hyperion", Some(1989), 2, "NY", Some(33), 5.0),
        row("0002", "Hyperion", Some(1989), 2, "NY", Some(33), 4.0),
        row("0002", "Hyperion", Some(1989), 2, "NY", Some(33), 4.5),
        row("0003", "Foundation", Some(1951), 2, "NY", Some(33), 3.0),
        row("0004", "Dune Messiah", Some(1969), 3, "LA", Some(30), 8.0),
        row("0005", "Lonely Book", None, 4, "Paris", Some(50), 7.0),
    ]
}

/// Serves lookups from memory but fails every recommendation query
struct FailingRecommendations(InMemoryBookStore);

#[async_trait::async_trait]
impl BookStore for FailingRecommendations {
    async fn lookup(
        &self,
        identifier: &str,
        mode: LookupMode,
    ) -> AppResult<Vec<BookInteractionRecord>> {
        self.0.lookup(identifier, mode).await
    }

    async fn recommend(&self, _: &str, _: i32, _: i64) -> AppResult<Vec<Recommendation>> {
        Err(AppError::Store(sqlx::Error::PoolTimedOut))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Fails every query
struct Unreachable;

#[async_trait::async_trait]
impl BookStore for Unreachable {
    async fn lookup(&self, _: &str, _: LookupMode) -> AppResult<Vec<BookInteractionRecord>> {
        Err(AppError::Store(sqlx::Error::PoolTimedOut))
    }

    async fn recommend(&self, _: &str, _: i32, _: i64) -> AppResult<Vec<Recommendation>> {
        Err(AppError::Store(sqlx::Error::PoolTimedOut))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

fn create_test_server(store: Arc<dyn BookStore>) -> TestServer {
    let app = create_router(Arc::new(AppState::new(store)));
    TestServer::new(app).unwrap()
}

fn library_server() -> TestServer {
    create_test_server(Arc::new(InMemoryBookStore::new(library())))
}

#[tokio::test]
async fn test_health_check() {
    let server = library_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_header_echoed() {
    let server = library_server();
    let id = "6f9619ff-8b86-4d11-b42d-00c04fc964ff";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id").to_str().unwrap(), id);
}

#[tokio::test]
async fn test_lookup_by_isbn() {
    let server = library_server();
    let response = server
        .get("/api/v1/books/lookup")
        .add_query_param("q", "0002")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["book"]["isbn"], "0002");
    assert_eq!(body["book"]["book_title"], "Hyperion");
    assert_eq!(body["matching_isbns"], 1);
}

#[tokio::test]
async fn test_lookup_unknown_isbn_is_not_found() {
    let server = library_server();
    let response = server
        .get("/api/v1/books/lookup")
        .add_query_param("q", "9999")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lookup_by_title_picks_newest_match() {
    let server = library_server();
    let response = server
        .get("/api/v1/books/lookup")
        .add_query_param("q", "dune")
        .add_query_param("mode", "title")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["book"]["isbn"], "0004");
    assert_eq!(body["matching_isbns"], 2);
}

#[tokio::test]
async fn test_lookup_rejects_overlong_isbn() {
    let server = library_server();
    let response = server
        .get("/api/v1/books/lookup")
        .add_query_param("q", "12345678901234")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_ranked() {
    let server = library_server();
    let response = server.get("/api/v1/books/0001/recommendations").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let isbns: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["isbn"].as_str().unwrap())
        .collect();
    assert_eq!(isbns, vec!["0002", "0003"]);
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn test_recommendations_for_isolated_reader_are_empty() {
    let server = library_server();
    let response = server.get("/api/v1/books/0005/recommendations").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommendation_fault_returns_warning() {
    let server = create_test_server(Arc::new(FailingRecommendations(InMemoryBookStore::new(
        library(),
    ))));
    let response = server.get("/api/v1/books/0001/recommendations").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 0);
    assert!(body["warning"]
        .as_str()
        .unwrap()
        .starts_with("Error while fetching recommendations"));
}

#[tokio::test]
async fn test_search_renders_book_and_recommendations() {
    let server = library_server();
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "0001" }))
        .await;

    response.assert_status_ok();
    let page: Value = response.json();
    let blocks = page["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["type"], "image");
    assert_eq!(blocks[0]["url"], "http://images.example/0001-m.jpg");
    assert_eq!(blocks[1]["text"], "Dune");

    let expanders: Vec<&Value> = blocks.iter().filter(|b| b["type"] == "expander").collect();
    assert_eq!(expanders.len(), 2);
    assert_eq!(expanders[0]["title"], "Hyperion by Author of Hyperion");
}

#[tokio::test]
async fn test_search_not_found_renders_error() {
    let server = library_server();
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "9999", "mode": "isbn" }))
        .await;

    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["blocks"][0]["type"], "error");
    assert_eq!(
        page["blocks"][0]["message"],
        "Book not found. Please enter a valid ISBN."
    );
}

#[tokio::test]
async fn test_search_survives_recommendation_fault() {
    let server = create_test_server(Arc::new(FailingRecommendations(InMemoryBookStore::new(
        library(),
    ))));
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "0001" }))
        .await;

    response.assert_status_ok();
    let page: Value = response.json();
    let blocks = page["blocks"].as_array().unwrap();
    assert!(blocks.iter().any(|b| b["type"] == "error"));
    assert_eq!(blocks.last().unwrap()["type"], "warning");
}

#[tokio::test]
async fn test_search_lookup_fault_aborts_request() {
    let server = create_test_server(Arc::new(Unreachable));
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "0001" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Store error"));
}
