//! End-to-end customer queries against the mock backend.
//!
//! Run with: cargo test -p iwb-integration-tests --test query_flow

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use iwb_client::matcher::FALLBACK_RESPONSE;
use iwb_client::queries::{PAGE_MALFORMED, RULES_MALFORMED, RULES_UNAVAILABLE};
use iwb_client::{ApiClient, ApiError, QueryDesk, StoreApi, view};
use iwb_core::{QueryField, QueryStatus};
use iwb_integration_tests::{Canned, MockBackend};

fn stored_query(n: usize) -> Value {
    json!({
        "_id": format!("seed{n}"),
        "name": format!("Customer {n}"),
        "email": format!("c{n}@example.com"),
        "message": format!("Question number {n}"),
        "status": if n % 2 == 0 { "Resolved" } else { "Pending" },
    })
}

fn rules_body() -> Value {
    json!([
        {"keywords": ["refund", "money back"], "responseText": "Refunds take 5-7 business days."},
        {"keywords": ["delivery", "shipping"], "responseText": "Orders ship within 2 days."},
        {"keywords": [], "responseText": "Thanks, we'll be in touch soon.", "isDefault": true}
    ])
}

async fn backend_with_rules() -> MockBackend {
    let backend = MockBackend::start().await.unwrap();
    backend.set_rules(Canned::json(&rules_body()));
    backend
}

fn fill(desk: &mut QueryDesk<&ApiClient>, message: &str) {
    desk.set_field(QueryField::Name, "Grace Hopper");
    desk.set_field(QueryField::Email, "grace@example.com");
    desk.set_field(QueryField::Message, message);
}

#[tokio::test]
async fn test_submission_uses_matched_reply_and_refreshes_history() {
    let backend = backend_with_rules().await;
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();
    assert!(desk.queries().is_empty());

    fill(&mut desk, "Where is my DELIVERY?");
    let reply = desk.submit().await.unwrap();
    assert_eq!(reply, "Orders ship within 2 days.");

    let posts = backend.requests_to(&Method::POST, "/api/queries");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "message": "Where is my DELIVERY?",
            "automatedResponse": "Orders ship within 2 days."
        }))
    );

    let gets = backend.requests_to(&Method::GET, "/api/queries");
    assert_eq!(gets.len(), 2);
    assert_eq!(gets[1].query.as_deref(), Some("page=1&limit=5"));

    assert_eq!(desk.queries().len(), 1);
    assert_eq!(desk.queries()[0].status, QueryStatus::Pending);
    assert!(desk.form().message.is_empty());

    let screen = view::render_query_desk(&desk);
    assert!(screen.contains("Thank you for your query!\nOrders ship within 2 days."));
    assert!(screen.contains("Grace Hopper (grace@example.com)"));
    assert!(screen.contains("Automated Response:\n  Orders ship within 2 days."));
    assert!(!screen.contains("Page 1 of"));
}

#[tokio::test]
async fn test_default_rule_and_fallback() {
    let backend = backend_with_rules().await;
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();

    fill(&mut desk, "Do you sell gift cards?");
    assert_eq!(desk.submit().await.unwrap(), "Thanks, we'll be in touch soon.");

    let backend = MockBackend::start().await.unwrap();
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();

    fill(&mut desk, "Do you sell gift cards?");
    assert_eq!(desk.submit().await.unwrap(), FALLBACK_RESPONSE);
}

#[tokio::test]
async fn test_paging_through_history() {
    let backend = MockBackend::start().await.unwrap();
    backend.seed_queries((1..=12).map(stored_query));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();

    assert_eq!(desk.pagination().page_count(), 3);
    assert_eq!(desk.queries()[0].message, "Question number 12");
    assert!(view::render_query_desk(&desk).contains("[Previous]  Page 1 of 3  Next"));

    assert!(desk.go_to_page(3).await.unwrap());
    assert_eq!(desk.queries().len(), 2);
    assert_eq!(desk.queries()[1].message, "Question number 1");

    assert!(!desk.go_to_page(4).await.unwrap());
    assert!(!desk.next_page().await.unwrap());
    assert_eq!(desk.pagination().current_page(), 3);

    assert!(desk.previous_page().await.unwrap());
    assert_eq!(desk.pagination().current_page(), 2);

    let pages: Vec<_> = backend
        .requests_to(&Method::GET, "/api/queries")
        .into_iter()
        .filter_map(|r| r.query)
        .collect();
    assert_eq!(
        pages,
        vec!["page=1&limit=5", "page=3&limit=5", "page=2&limit=5"]
    );
}

#[tokio::test]
async fn test_rules_failures_are_warnings() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_rules(Canned::with_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({"error": "db down"}),
    ));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();
    assert_eq!(desk.rules_warning(), Some(RULES_UNAVAILABLE));

    backend.set_rules(Canned::json(&json!({"rules": []})));
    desk.load_rules().await;
    assert_eq!(desk.rules_warning(), Some(RULES_MALFORMED));
    assert!(view::render_query_desk(&desk).contains(&format!("Warning: {RULES_MALFORMED}")));

    fill(&mut desk, "refund please");
    assert_eq!(desk.submit().await.unwrap(), FALLBACK_RESPONSE);
}

#[tokio::test]
async fn test_malformed_history_page() {
    let backend = MockBackend::start().await.unwrap();
    backend.override_queries(Canned::json(&json!({"items": []})));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);

    let err = desk.open().await.unwrap_err();
    assert_eq!(err.to_string(), PAGE_MALFORMED);
    assert_eq!(desk.pagination().total_count(), 0);
    assert!(view::render_query_desk(&desk).contains(&format!("Error: {PAGE_MALFORMED}")));
}

#[tokio::test]
async fn test_server_rejection_message() {
    let backend = MockBackend::start().await.unwrap();
    backend.fail_next_create(Canned::with_status(
        StatusCode::UNPROCESSABLE_ENTITY,
        &json!({"error": "Message too long"}),
    ));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();

    fill(&mut desk, "hello");
    let err = desk.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Submission failed: 422 - Message too long");
    assert_eq!(desk.form().message, "hello");
    assert!(desk.response().is_none());
    assert!(backend.stored_queries().is_empty());

    backend.fail_next_create(Canned::raw(StatusCode::INTERNAL_SERVER_ERROR, ""));
    let err = desk.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Submission failed: 500 - Server error.");
}

#[tokio::test]
async fn test_unreachable_backend() {
    let backend = MockBackend::start().await.unwrap();
    let mut config = backend.api_config().unwrap();
    config.query_timeout = Duration::from_secs(2);
    drop(backend);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let api = ApiClient::new(&config).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap_err();
    assert!(matches!(
        api.automated_responses().await,
        Err(ApiError::NoResponse(_))
    ));

    fill(&mut desk, "hello");
    let err = desk.submit().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Submission failed: No response from server. Please check your network connection."
    );
}

#[tokio::test]
async fn test_slow_submission_times_out() {
    let backend = MockBackend::start().await.unwrap();
    backend.delay_posts(Duration::from_secs(3));
    let mut config = backend.api_config().unwrap();
    config.query_timeout = Duration::from_secs(1);
    let api = ApiClient::new(&config).unwrap();
    let mut desk = QueryDesk::new(&api, 5);
    desk.open().await.unwrap();

    fill(&mut desk, "hello");
    let err = desk.submit().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Submission failed: No response from server. Please check your network connection."
    );
    assert_eq!(desk.form().message, "hello");
    assert!(desk.response().is_none());
}
