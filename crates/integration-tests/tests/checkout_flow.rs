//! End-to-end checkout against the mock backend.
//!
//! Run with: cargo test -p iwb-integration-tests --test checkout_flow

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;

use iwb_client::checkout::{CheckoutError, CheckoutStatus};
use iwb_client::storage::{CheckoutStorage, FileStore, LocalStore, keys};
use iwb_client::{ApiClient, ApiError, CheckoutSession, view};
use iwb_core::{BuyerField, CartItem, CartSnapshot, UserId};
use iwb_integration_tests::{Canned, MockBackend};

fn staged_store(dir: &tempfile::TempDir) -> FileStore {
    let store = FileStore::open(dir.path()).unwrap();
    CheckoutStorage::new(&store)
        .stage_cart(&CartSnapshot {
            items: vec![
                CartItem::new("Lavender Soap", 2, Decimal::new(450, 2)),
                CartItem::new("Loofah", 1, Decimal::new(300, 2)),
            ],
            total: Decimal::new(1200, 2),
            user_id: UserId::new("u-42"),
        })
        .unwrap();
    store
}

fn fill<S: LocalStore>(session: &mut CheckoutSession<&ApiClient, S>) {
    session.update_field(BuyerField::Name, "Ada Lovelace").unwrap();
    session.update_field(BuyerField::Email, "ada@example.com").unwrap();
    session.update_field(BuyerField::Address, "1 Analytical Way").unwrap();
    session.update_field(BuyerField::PaymentInfo, "4111111111111111").unwrap();
}

#[tokio::test]
async fn test_order_is_placed_and_local_data_cleared() {
    let backend = MockBackend::start().await.unwrap();
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);
    store.set("cart", "[]").unwrap();

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    let summary = session.submit().await.unwrap();

    let requests = backend.requests_to(&Method::POST, "/api/checkout");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, Some(json!({"customerName": "Ada Lovelace"})));
    assert!(requests[0].request_id.is_some());

    assert_eq!(
        summary.confirmation.message.as_deref(),
        Some("Order placed successfully")
    );
    assert_eq!(summary.confirmation.details.get("saleId"), Some(&json!("s-1001")));

    for key in keys::CHECKOUT {
        assert_eq!(store.get(key).unwrap(), None, "{key} should be cleared");
    }
    assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));

    let screen = view::render_checkout(&session);
    assert!(screen.contains("Thank you for your order!"));
    assert!(screen.contains("Lavender Soap x2  $9.00"));
    assert!(screen.contains("Total: $12.00"));
    assert!(screen.contains("A confirmation email will be sent to ada@example.com"));
    assert!(!screen.contains("Order Total:"));
}

#[tokio::test]
async fn test_draft_survives_reopen() {
    let backend = MockBackend::start().await.unwrap();
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    {
        let store = staged_store(&dir);
        let mut session = CheckoutSession::open(&api, &store).unwrap();
        session.update_field(BuyerField::Name, "Ada").unwrap();
        session.update_field(BuyerField::Email, "ada@example.com").unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    let session = CheckoutSession::open(&api, &store).unwrap();
    assert_eq!(session.buyer().name, "Ada");
    assert_eq!(session.buyer().email, "ada@example.com");
    assert_eq!(session.cart().items.len(), 2);
    assert_eq!(session.cart().user_id, UserId::new("u-42"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_incomplete_draft_sends_nothing() {
    let backend = MockBackend::start().await.unwrap();
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    session.update_field(BuyerField::Name, "Ada").unwrap();

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Validation(_)));
    assert!(view::render_checkout(&session).contains("Error: Please fill out all required fields."));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_order_keeps_draft_and_shows_server_error() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_checkout(Canned::with_status(
        StatusCode::BAD_REQUEST,
        &json!({"error": "Cart is empty"}),
    ));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    let stored_draft = store.get(keys::BUYER_INFO).unwrap();

    let err = session.submit().await.unwrap_err();
    let CheckoutError::Api { source, message } = err else {
        panic!("expected an API error");
    };
    assert_eq!(message, "Cart is empty");
    assert!(matches!(source, ApiError::Status { status: 400, .. }));

    assert_eq!(session.status(), &CheckoutStatus::Failed);
    assert_eq!(store.get(keys::BUYER_INFO).unwrap(), stored_draft);
    assert!(store.get(keys::CART_ITEMS).unwrap().is_some());

    let screen = view::render_checkout(&session);
    assert!(screen.contains("Order Processing Error"));
    assert!(screen.contains("Cart is empty"));
}

#[tokio::test]
async fn test_server_error_without_body_uses_status_message() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_checkout(Canned::raw(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    session.submit().await.unwrap_err();

    assert_eq!(session.error(), Some("API POST error: 502"));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = MockBackend::start().await.unwrap();
    let mut config = backend.api_config().unwrap();
    config.token = Some(SecretString::from("tok_test"));
    let api = ApiClient::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    session.submit().await.unwrap();

    let request = backend.requests().pop().unwrap();
    assert_eq!(request.authorization.as_deref(), Some("Bearer tok_test"));
}

#[tokio::test]
async fn test_slow_checkout_is_not_timed_out() {
    let backend = MockBackend::start().await.unwrap();
    backend.delay_posts(Duration::from_secs(2));
    let mut config = backend.api_config().unwrap();
    config.query_timeout = Duration::from_secs(1);
    let api = ApiClient::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    let summary = session.submit().await.unwrap();

    assert_eq!(
        summary.confirmation.message.as_deref(),
        Some("Order placed successfully")
    );
    assert_eq!(store.get(keys::BUYER_INFO).unwrap(), None);
}

#[tokio::test]
async fn test_plain_text_confirmation_still_completes_order() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_checkout(Canned::raw(StatusCode::OK, "Order received"));
    let api = ApiClient::new(&backend.api_config().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = staged_store(&dir);

    let mut session = CheckoutSession::open(&api, &store).unwrap();
    fill(&mut session);
    let summary = session.submit().await.unwrap();

    assert!(summary.confirmation.message.is_none());
    assert!(matches!(session.status(), CheckoutStatus::Succeeded(_)));
    for key in keys::CHECKOUT {
        assert_eq!(store.get(key).unwrap(), None, "{key} should be cleared");
    }
}
