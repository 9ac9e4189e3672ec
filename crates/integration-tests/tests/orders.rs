//! Order endpoints driven through the full router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use paygate_integration_tests::{RecordingGateway, TestApp, checkout_payload};
use serde_json::json;

// =============================================================================
// Order creation
// =============================================================================

#[tokio::test]
async fn test_create_order_returns_reference_and_checkout_url() {
    let app = TestApp::new();

    let (status, body) = app.post_json("/api/order", &checkout_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["reference_id"], json!("ord-test-1"));
    assert_eq!(
        body["checkout_url"],
        json!("https://checkout.example.test/ord-test-1")
    );
    assert_eq!(app.gateway.operations(), vec!["create_order"]);
}

#[tokio::test]
async fn test_create_order_payload_shape() {
    let app = TestApp::new();
    app.post_json("/api/order", &checkout_payload()).await;

    let order = app.gateway.payload_of("create_order").unwrap();

    // 0.10 + 2 × 0.10, no binary rounding drift
    assert_eq!(order["amount"].to_string(), "0.30");
    assert_eq!(order["currency"], json!("TRY"));
    assert_eq!(order["locale"], json!("tr"));
    assert_eq!(order["buyer"]["name"], json!("Ada"));
    assert_eq!(order["buyer"]["surname"], json!("Lovelace"));
    assert_eq!(order["buyer"]["country"], json!("Turkey"));
    assert_eq!(order["basket_items"].as_array().unwrap().len(), 2);
    assert_eq!(order["basket_items"][0]["id"].as_str().unwrap().len(), 8);
    assert_eq!(order["basket_items"][1]["quantity"], json!(2));

    // Return URLs follow the request's own origin
    assert_eq!(
        order["callback_url"],
        json!("http://shop.example.com/api/callback")
    );
    assert_eq!(
        order["payment_success_url"],
        json!("http://shop.example.com/payment/success")
    );
    assert_eq!(
        order["payment_failure_url"],
        json!("http://shop.example.com/payment/failure")
    );

    let conversation_id = order["conversation_id"].as_str().unwrap();
    assert!(!conversation_id.is_empty());
}

#[tokio::test]
async fn test_shipping_falls_back_to_buyer_address() {
    let app = TestApp::new();
    app.post_json("/api/order", &checkout_payload()).await;

    let order = app.gateway.payload_of("create_order").unwrap();
    let buyer = &order["buyer"];
    let shipping = &order["shipping_address"];

    assert_eq!(shipping["contact_name"], json!("Ada Lovelace"));
    assert_eq!(shipping["city"], buyer["city"]);
    assert_eq!(shipping["address"], buyer["registration_address"]);
    assert_eq!(shipping["zip_code"], buyer["zip_code"]);
    assert_eq!(shipping["country"], buyer["country"]);
}

#[tokio::test]
async fn test_explicit_shipping_is_used() {
    let app = TestApp::new();
    let mut payload = checkout_payload();
    payload["shipping"] = json!({
        "contact_name": "Charles Babbage",
        "address": "2 Difference Rd",
        "city": "Ankara",
        "zip_code": "06000"
    });

    app.post_json("/api/order", &payload).await;

    let order = app.gateway.payload_of("create_order").unwrap();
    assert_eq!(order["shipping_address"]["contact_name"], json!("Charles Babbage"));
    assert_eq!(order["shipping_address"]["city"], json!("Ankara"));
}

#[tokio::test]
async fn test_client_conversation_id_and_metadata() {
    let app = TestApp::new();
    let mut payload = checkout_payload();
    payload["conversation_id"] = json!("conv-42");
    payload["installment"] = json!("3");

    app.post_json("/api/order", &payload).await;

    let order = app.gateway.payload_of("create_order").unwrap();
    assert_eq!(order["conversation_id"], json!("conv-42"));

    let metadata = order["metadata"].as_array().unwrap();
    let value_of = |key: &str| {
        metadata
            .iter()
            .find(|entry| entry["key"] == json!(key))
            .map(|entry| entry["value"].clone())
    };
    assert_eq!(value_of("cart_items_count"), Some(json!("2")));
    assert_eq!(value_of("selected_installment"), Some(json!("3")));
    assert!(value_of("application_name").is_some());
}

#[tokio::test]
async fn test_checkout_url_is_looked_up_when_missing() {
    let app = TestApp::with_gateway(RecordingGateway::default().without_checkout_url());

    let (status, body) = app.post_json("/api/order", &checkout_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkout_url"], json!("https://checkout.example.test/lookup"));
    assert_eq!(app.gateway.operations(), vec!["create_order", "checkout_url"]);
}

#[tokio::test]
async fn test_failed_lookup_still_reports_created_order() {
    let app = TestApp::with_gateway(
        RecordingGateway::default()
            .without_checkout_url()
            .failing_lookup(),
    );

    let (status, body) = app.post_json("/api/order", &checkout_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["reference_id"], json!("ord-test-1"));
    assert!(body["checkout_url"].is_null());
}

// =============================================================================
// Validation failures never reach the gateway
// =============================================================================

#[tokio::test]
async fn test_empty_cart_is_rejected_without_gateway_call() {
    let app = TestApp::new();
    let mut payload = checkout_payload();
    payload["cart"] = json!([]);

    let (status, body) = app.post_json("/api/order", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("cart"));
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_missing_billing_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json("/api/order", &json!({ "cart": [{ "name": "Pen", "price": 1, "quantity": 1 }] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_non_numeric_price_is_rejected() {
    let app = TestApp::new();
    let mut payload = checkout_payload();
    payload["cart"] = json!([{ "name": "Pen", "price": "cheap", "quantity": 1 }]);

    let (status, _) = app.post_json("/api/order", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.post_raw("/api/order", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

// =============================================================================
// Gateway failures
// =============================================================================

#[tokio::test]
async fn test_gateway_rejection_becomes_failure_envelope() {
    let app =
        TestApp::with_gateway(RecordingGateway::default().rejecting(422, "amount mismatch"));

    let (status, body) = app.post_json("/api/order", &checkout_payload()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("amount mismatch"));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = TestApp::with_gateway(RecordingGateway::default().rejecting(404, "order not found"));

    let (status, body) = app.get("/api/order/details/ord-missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Not found: order not found"));
}

// =============================================================================
// Passthrough calls
// =============================================================================

#[tokio::test]
async fn test_list_treats_empty_query_values_as_absent() {
    let app = TestApp::new();

    let (status, body) = app
        .get("/api/order/list?page=&per_page=5&start_date=&buyer_id=b-1")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("list_orders"));
    let filter = &body["request"];
    assert_eq!(filter["page"], json!(1));
    assert_eq!(filter["per_page"], json!(5));
    assert_eq!(filter["buyer_id"], json!("b-1"));
    assert!(filter.get("start_date").is_none());
}

#[tokio::test]
async fn test_list_rejects_bad_page() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/order/list?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_read_passthroughs() {
    let app = TestApp::new();

    let cases = [
        ("/api/order/details/ord-9", "order_details"),
        ("/api/order/conversation/conv-9", "order_by_conversation"),
        ("/api/order/transactions/ord-9", "order_transactions"),
        ("/api/payment/status/ord-9", "order_status"),
        ("/api/order/submerchants", "order_submerchants"),
        ("/api/organization/settings", "organization_settings"),
    ];

    for (path, operation) in cases {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body["operation"], json!(operation), "{path}");
    }
}

#[tokio::test]
async fn test_mutation_passthroughs() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/order/terminate", &json!({ "reference_id": "ord-1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("terminate_order"));

    let (status, body) = app
        .post_json("/api/order/cancel", &json!({ "reference_id": "ord-1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], json!("cancel_order"));

    let (status, body) = app
        .post_json(
            "/api/order/refund",
            &json!({ "reference_id": "ord-1", "amount": "12.50" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["amount"].to_string(), "12.50");

    let (status, body) = app
        .post_json(
            "/api/order/manual-callback",
            &json!({ "reference_id": "ord-1", "conversation_id": "conv-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["conversation_id"], json!("conv-1"));
}

#[tokio::test]
async fn test_mutation_requires_reference() {
    let app = TestApp::new();
    let (status, body) = app.post_json("/api/order/cancel", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("reference_id"));
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}
