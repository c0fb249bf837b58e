//! Integration tests for the storefront checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and coupon seeds
//! - The storefront server running (cargo run -p bagworks-storefront)
//! - `CUSTOMER_TOKEN` set to a valid customer bearer token
//!
//! Run with: cargo test -p bagworks-integration-tests -- --ignored

use bagworks_integration_tests::{customer_token, storefront_base_url};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Create a client with the customer bearer token attached.
fn client() -> Client {
    Client::new()
}

fn auth(token: &str) -> String {
    format!("Bearer {token}")
}

/// Test helper: add an item to the cart.
async fn add_cart_item(client: &Client, name: &str, selling: i64, mrp: i64) -> Value {
    let resp = client
        .post(format!("{}/cart/items", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "product_id": 1,
            "name": name,
            "unit_selling_price": selling,
            "unit_mrp": mrp,
            "quantity": 1,
        }))
        .send()
        .await
        .expect("Failed to add cart item");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to read cart item")
}

/// Test helper: create a default address, returning its id.
async fn create_default_address(client: &Client) -> i64 {
    let resp = client
        .post(format!("{}/user/addresses", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "name": "Asha Rao",
            "phone": "9876543210",
            "address_line": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
            "is_default": true,
        }))
        .send()
        .await
        .expect("Failed to create address");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to read address");
    body["id"].as_i64().expect("address id")
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_token_is_rejected() {
    let resp = client()
        .get(format!("{}/cart", storefront_base_url()))
        .header("Authorization", auth(&Uuid::new_v4().to_string()))
        .send()
        .await
        .expect("Failed to fetch cart");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Address Book Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_default_address_clears_first() {
    let client = client();
    let base_url = storefront_base_url();

    create_default_address(&client).await;
    create_default_address(&client).await;

    let resp = client
        .get(format!("{base_url}/user/addresses"))
        .header("Authorization", auth(&customer_token()))
        .send()
        .await
        .expect("Failed to list addresses");
    assert_eq!(resp.status(), StatusCode::OK);

    let addresses: Vec<Value> = resp.json().await.expect("Failed to read addresses");
    let defaults = addresses
        .iter()
        .filter(|a| a["is_default"].as_bool() == Some(true))
        .count();
    assert_eq!(defaults, 1, "exactly one default address must survive");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_address_validation_reports_fields() {
    let client = client();

    let resp = client
        .post(format!("{}/user/addresses", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "name": "",
            "phone": "123",
            "address_line": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "56",
        }))
        .send()
        .await
        .expect("Failed to post address");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "validation_failed");
    let fields = body["error"]["fields"].as_array().expect("fields array");
    // name, phone, and pincode all failed, and all are reported.
    assert!(fields.len() >= 3);
}

// ============================================================================
// Checkout Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server, database, and coupon seeds"]
async fn test_quote_applies_save10() {
    let client = client();

    add_cart_item(&client, "Canvas Tote", 100_000, 120_000).await;

    let resp = client
        .post(format!("{}/checkout/quote", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({"source": "cart", "coupon_code": "save10"}))
        .send()
        .await
        .expect("Failed to quote");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read quote");
    // Case-insensitive lookup normalizes the code.
    assert_eq!(body["coupon_code"], "SAVE10");
    let price = &body["price"];
    assert_eq!(
        price["grand_total"].as_i64().expect("grand_total"),
        price["subtotal"].as_i64().expect("subtotal")
            - price["coupon_discount"].as_i64().expect("coupon_discount")
            + price["shipping"].as_i64().expect("shipping")
            + price["tax"].as_i64().expect("tax")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_submission_without_address_is_rejected() {
    let client = client();

    add_cart_item(&client, "Canvas Tote", 100_000, 120_000).await;

    let resp = client
        .post(format!("{}/orders", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({"source": "cart", "payment_method": "upi"}))
        .send()
        .await
        .expect("Failed to submit");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "missing_address");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_submission_creates_order_and_clears_cart() {
    let client = client();
    let base_url = storefront_base_url();

    add_cart_item(&client, "Leather Satchel", 250_000, 300_000).await;
    let address_id = create_default_address(&client).await;

    let resp = client
        .post(format!("{base_url}/orders"))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "source": "cart",
            "address": address_id,
            "payment_method": "cod",
        }))
        .send()
        .await
        .expect("Failed to submit order");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to read order");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert!(
        body["data"]["order_number"]
            .as_str()
            .expect("order_number")
            .starts_with("ORD-")
    );

    // The source cart was consumed by the submission.
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .header("Authorization", auth(&customer_token()))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to read cart");
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_buy_now_leaves_cart_untouched() {
    let client = client();
    let base_url = storefront_base_url();

    add_cart_item(&client, "Canvas Tote", 100_000, 120_000).await;
    let address_id = create_default_address(&client).await;

    let resp = client
        .post(format!("{base_url}/orders"))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "source": "buy_now",
            "address": address_id,
            "payment_method": "upi",
            "items": [{
                "product_id": 9,
                "name": "Gift Pouch",
                "unit_selling_price": 50_000,
                "unit_mrp": 50_000,
                "quantity": 1,
            }],
        }))
        .send()
        .await
        .expect("Failed to submit buy-now order");

    assert_eq!(resp.status(), StatusCode::CREATED);

    // Buy-now bypasses the cart entirely.
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .header("Authorization", auth(&customer_token()))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to read cart");
    assert!(cart["item_count"].as_u64().expect("item_count") >= 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server, database, and coupon seeds"]
async fn test_flat100_below_minimum_reports_shortfall() {
    let client = client();

    let resp = client
        .post(format!("{}/checkout/quote", storefront_base_url()))
        .header("Authorization", auth(&customer_token()))
        .json(&json!({
            "source": "buy_now",
            "coupon_code": "FLAT100",
            "items": [{
                "product_id": 3,
                "name": "Coin Pouch",
                "unit_selling_price": 5_000,
                "unit_mrp": 5_000,
                "quantity": 1,
            }],
        }))
        .send()
        .await
        .expect("Failed to quote");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to read error");
    assert_eq!(body["error"]["code"], "min_cart_not_met");
    // The message names the missing amount.
    assert!(
        body["error"]["message"]
            .as_str()
            .expect("message")
            .contains("more")
    );
}
