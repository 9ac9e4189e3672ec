//! Webhook receivers and listing driven through the full router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::StatusCode;
use paygate_facade::routes::webhooks::WEBHOOK_BODY_LIMIT;
use paygate_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_listing_empty_store_returns_empty_list() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/webhooks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_callback_is_acknowledged_and_stored() {
    let app = TestApp::new();
    let payload = r#"{"reference_id":"ord-1","status":"SUCCESS"}"#;

    let (status, body) = app.post_raw("/api/callback", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (_, listing) = app.get("/api/webhooks").await;
    let records = listing.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["kind"], json!("callback"));
    assert_eq!(records[0]["raw"], json!(payload));
    assert_eq!(records[0]["content"]["status"], json!("SUCCESS"));
    assert!(
        records[0]["filename"]
            .as_str()
            .unwrap()
            .ends_with("_callback.json")
    );
}

#[tokio::test]
async fn test_callback_acknowledged_when_store_is_unwritable() {
    let app = TestApp::with_unwritable_store();

    let (status, body) = app.post_raw("/api/callback", r#"{"status":"SUCCESS"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

/// JSON object whose serialized form is about `size` bytes.
fn padded_body(size: usize) -> String {
    format!(r#"{{"reference_id":"ord-1","padding":"{}"}}"#, "x".repeat(size))
}

#[tokio::test]
async fn test_large_callback_is_stored_and_acknowledged() {
    let app = TestApp::new();
    let body = padded_body(3 * 1024 * 1024);

    let (status, ack) = app.post_raw("/api/callback", body.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "status": "ok" }));

    let (_, listing) = app.get("/api/webhooks").await;
    assert_eq!(listing[0]["raw"].as_str().unwrap().len(), body.len());
}

#[tokio::test]
async fn test_callback_over_body_limit_is_still_acknowledged() {
    let app = TestApp::new();

    let (status, ack) = app
        .post_raw("/api/refund_callback", padded_body(WEBHOOK_BODY_LIMIT + 1))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "status": "ok" }));

    let (_, listing) = app.get("/api/webhooks").await;
    assert_eq!(listing, json!([]));
}

#[tokio::test]
async fn test_every_callback_kind_is_recorded() {
    let app = TestApp::new();

    for (path, kind) in [
        ("/api/callback", "callback"),
        ("/api/fail_callback", "fail"),
        ("/api/refund_callback", "refund"),
        ("/api/cancel_callback", "cancel"),
    ] {
        let (status, body) = app.post_raw(path, format!(r#"{{"kind":"{kind}"}}"#)).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, json!({ "status": "ok" }), "{path}");
    }

    let (_, listing) = app.get("/api/webhooks").await;
    let mut kinds: Vec<String> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["kind"].as_str().unwrap().to_string())
        .collect();
    kinds.sort();
    assert_eq!(kinds, vec!["callback", "cancel", "fail", "refund"]);
}

#[tokio::test]
async fn test_listing_is_most_recent_first() {
    let app = TestApp::new();

    app.post_raw("/api/callback", r#"{"n":1}"#).await;
    // Past the one-second resolution of the record timestamps.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    app.post_raw("/api/callback", r#"{"n":2}"#).await;

    let (_, listing) = app.get("/api/webhooks").await;
    let records = listing.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["content"]["n"], json!(2));
    assert_eq!(records[1]["content"]["n"], json!(1));
}

#[tokio::test]
async fn test_non_json_body_is_kept_raw_with_error() {
    let app = TestApp::new();

    let (status, _) = app.post_raw("/api/callback", "status=SUCCESS&ref=1").await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = app.get("/api/webhooks").await;
    let record = &listing[0];
    assert_eq!(record["raw"], json!("status=SUCCESS&ref=1"));
    assert!(record.get("content").is_none());
    assert!(record["error"].is_string());
}

#[tokio::test]
async fn test_listing_is_capped_at_twenty() {
    let app = TestApp::new();

    for n in 0..25 {
        app.post_raw("/api/callback", format!(r#"{{"n":{n}}}"#)).await;
    }

    let (_, listing) = app.get("/api/webhooks").await;
    assert_eq!(listing.as_array().unwrap().len(), 20);
}
