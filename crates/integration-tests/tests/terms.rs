//! Installment-term endpoints driven through the full router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use paygate_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_update_with_only_due_date_does_not_send_amount() {
    let app = TestApp::new();

    let (status, _) = app
        .post_json(
            "/api/term/update",
            &json!({ "term_reference_id": "term-1", "due_date": "2026-12-15" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let update = app.gateway.payload_of("update_term").unwrap();
    assert_eq!(update["term_reference_id"], json!("term-1"));
    assert_eq!(update["due_date"], json!("2026-12-15"));
    assert!(update.get("amount").is_none());
    assert!(update.get("status").is_none());
    assert!(update.get("paid_date").is_none());
}

#[tokio::test]
async fn test_update_without_changes_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/term/update", &json!({ "term_reference_id": "term-1" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_term() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/term/create",
            &json!({
                "reference_id": "ord-1",
                "amount": "150.00",
                "due_date": "2026-11-30",
                "term_sequence": 1,
                "required": true
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("create_term"));
    assert_eq!(body["request"]["amount"].to_string(), "150.00");
    assert_eq!(body["request"]["order_id"], json!("ord-1"));
}

#[tokio::test]
async fn test_create_term_requires_due_date() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/term/create", &json!({ "reference_id": "ord-1", "amount": 10 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("due_date"));
}

#[tokio::test]
async fn test_show_refund_delete_and_scan() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/term/term-7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("term"));
    assert_eq!(body["request"], json!("term-7"));

    let (status, body) = app
        .post_json("/api/term/refund", &json!({ "term_id": "term-7", "amount": 20 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("refund_term"));

    let (status, body) = app
        .post_json(
            "/api/term/delete",
            &json!({ "order_id": "ord-1", "term_reference_id": "term-7" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("delete_term"));

    let (status, body) = app.get("/api/term/scan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("list_orders"));
    assert_eq!(body["request"]["page"], json!(1));
    assert_eq!(body["request"]["per_page"], json!(20));
}
