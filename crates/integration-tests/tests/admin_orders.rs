//! Integration tests for the admin order console.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - Both servers running (storefront creates the orders under test)
//! - `CUSTOMER_TOKEN` and `STAFF_TOKEN` set to valid bearer tokens
//!
//! Run with: cargo test -p bagworks-integration-tests -- --ignored

use bagworks_core::OrderStatus;
use bagworks_integration_tests::{
    admin_base_url, customer_token, staff_token, storefront_base_url,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn auth(token: &str) -> String {
    format!("Bearer {token}")
}

/// Test helper: place an order through the storefront, returning its id.
async fn place_order(client: &Client) -> i64 {
    let storefront = storefront_base_url();

    let resp = client
        .post(format!("{storefront}/user/addresses"))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "name": "Asha Rao",
            "phone": "9876543210",
            "address_line": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
        }))
        .send()
        .await
        .expect("Failed to create address");
    let address: Value = resp.json().await.expect("Failed to read address");
    let address_id = address["id"].as_i64().expect("address id");

    let resp = client
        .post(format!("{storefront}/orders"))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "source": "buy_now",
            "address": address_id,
            "payment_method": "upi",
            "items": [{
                "product_id": 1,
                "name": "Canvas Tote",
                "unit_selling_price": 100_000,
                "unit_mrp": 120_000,
                "quantity": 1,
            }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to read order");
    body["data"]["id"].as_i64().expect("order id")
}

/// Test helper: transition an order, returning the response.
async fn transition(client: &Client, order_id: i64, status: &str) -> reqwest::Response {
    client
        .patch(format!("{}/orders/{order_id}/status", admin_base_url()))
        .header("Authorization", auth(&staff_token()))
        .json(&json!({"status": status}))
        .send()
        .await
        .expect("Failed to transition order")
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_happy_path_transitions_step_by_step() {
    let client = Client::new();
    let order_id = place_order(&client).await;

    for status in ["confirmed", "processing", "packed", "shipped", "delivered"] {
        let resp = transition(&client, order_id, status).await;
        assert_eq!(resp.status(), StatusCode::OK, "transition to {status}");
        let body: Value = resp.json().await.expect("Failed to read order");
        assert_eq!(body["status"], status);
    }
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_direct_delivery_is_rejected() {
    let client = Client::new();
    let order_id = place_order(&client).await;

    let resp = transition(&client, order_id, "delivered").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "invalid_transition");
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_terminal_order_rejects_transitions() {
    let client = Client::new();
    let order_id = place_order(&client).await;

    let resp = transition(&client, order_id, "cancelled").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = transition(&client, order_id, "confirmed").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "order_already_terminal");
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_bulk_transition_reports_per_order_results() {
    let client = Client::new();
    let a = place_order(&client).await;
    let b = place_order(&client).await;

    // B goes terminal first; the bulk confirm must still succeed for A.
    let resp = transition(&client, b, "cancelled").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .patch(format!("{}/orders/bulk/status", admin_base_url()))
        .header("Authorization", auth(&staff_token()))
        .json(&json!({"order_ids": [a, b], "status": "confirmed"}))
        .send()
        .await
        .expect("Failed to bulk transition");
    assert_eq!(resp.status(), StatusCode::OK);

    let results: Vec<Value> = resp.json().await.expect("Failed to read results");
    assert_eq!(results.len(), 2);

    let result_a = results
        .iter()
        .find(|r| r["order_id"].as_i64() == Some(a))
        .expect("result for A");
    assert_eq!(result_a["success"], true);

    let result_b = results
        .iter()
        .find(|r| r["order_id"].as_i64() == Some(b))
        .expect("result for B");
    assert_eq!(result_b["success"], false);
    assert_eq!(result_b["error"]["code"], "order_already_terminal");
}

// ============================================================================
// Tracking, Notes, and Payment Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_tracking_is_write_once() {
    let client = Client::new();
    let order_id = place_order(&client).await;
    let url = format!("{}/orders/{order_id}/tracking", admin_base_url());

    let resp = client
        .patch(&url)
        .header("Authorization", auth(&staff_token()))
        .json(&json!({"tracking_id": "AWB123456", "courier_name": "BlueDart"}))
        .send()
        .await
        .expect("Failed to attach tracking");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .patch(&url)
        .header("Authorization", auth(&staff_token()))
        .json(&json!({"tracking_id": "AWB999999", "courier_name": "Delhivery"}))
        .send()
        .await
        .expect("Failed to re-attach tracking");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "tracking_already_set");
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_payment_override_is_audited_as_note() {
    let client = Client::new();
    let order_id = place_order(&client).await;
    let admin = admin_base_url();

    let resp = client
        .patch(format!("{admin}/orders/{order_id}/payment-status"))
        .header("Authorization", auth(&staff_token()))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("Failed to override payment status");
    assert_eq!(resp.status(), StatusCode::OK);

    let order: Value = client
        .get(format!("{admin}/orders/{order_id}"))
        .header("Authorization", auth(&staff_token()))
        .send()
        .await
        .expect("Failed to fetch order")
        .json()
        .await
        .expect("Failed to read order");

    assert_eq!(order["payment_status"], "paid");
    let notes = order["notes"].as_array().expect("notes array");
    assert!(
        notes.iter().any(|n| {
            n["message"]
                .as_str()
                .is_some_and(|m| m.contains("manually changed"))
        }),
        "override must leave an audit note"
    );
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_history_grows_with_each_transition() {
    let client = Client::new();
    let order_id = place_order(&client).await;
    let admin = admin_base_url();

    transition(&client, order_id, "confirmed").await;
    transition(&client, order_id, "processing").await;

    let order: Value = client
        .get(format!("{admin}/orders/{order_id}"))
        .header("Authorization", auth(&staff_token()))
        .send()
        .await
        .expect("Failed to fetch order")
        .json()
        .await
        .expect("Failed to read order");

    let history = order["status_history"].as_array().expect("history array");
    // Creation entry plus two transitions, in order.
    assert_eq!(history.len(), 3);
    let statuses: Vec<OrderStatus> = history
        .iter()
        .map(|h| {
            h["status"]
                .as_str()
                .expect("status string")
                .parse()
                .expect("valid status")
        })
        .collect();
    assert_eq!(
        statuses,
        [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
        ]
    );
}
