//! Integration tests for favorites, reviews, and checkout access control.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - Seed data loaded (cargo run -p townsquare-cli -- seed)
//! - The marketplace server running (cargo run -p townsquare-marketplace)
//!
//! Run with: cargo test -p townsquare-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use townsquare_integration_tests::TestContext;

/// Fetch the first seeded business's id.
async fn first_business_id(ctx: &TestContext) -> i64 {
    let (status, body) = ctx.get_json("/api/businesses").await;
    assert_eq!(status, StatusCode::OK);
    let businesses = body.as_array().expect("business list");
    assert!(!businesses.is_empty(), "seed data missing, run ts-cli seed");
    businesses[0]["id"].as_i64().expect("business id")
}

async fn business_detail(ctx: &TestContext, id: i64) -> Value {
    let (status, body) = ctx.get_json(&format!("/api/businesses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

// ============================================================================
// Favorites
// ============================================================================

#[tokio::test]
#[ignore = "Requires running marketplace server and seed data"]
async fn favorite_add_is_idempotent() {
    let ctx = TestContext::new();
    ctx.register_customer().await;
    let business_id = first_business_id(&ctx).await;

    for _ in 0..2 {
        let resp = ctx
            .client
            .put(ctx.url(&format!("/api/favorites/business/{business_id}")))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let (status, body) = ctx.get_json("/api/favorites").await;
    assert_eq!(status, StatusCode::OK);
    let matching = body
        .as_array()
        .expect("favorite list")
        .iter()
        .filter(|f| f["item_id"].as_i64() == Some(business_id))
        .count();
    assert_eq!(matching, 1, "double add must not duplicate");
}

#[tokio::test]
#[ignore = "Requires running marketplace server and seed data"]
async fn favorite_remove_then_list_is_empty() {
    let ctx = TestContext::new();
    ctx.register_customer().await;
    let business_id = first_business_id(&ctx).await;

    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/favorites/business/{business_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/favorites/business/{business_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, body) = ctx.get_json("/api/favorites").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().expect("favorite list").is_empty());
}

// ============================================================================
// Reviews & rating aggregation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running marketplace server and seed data"]
async fn reviews_move_the_rating_aggregate() {
    let anon = TestContext::new();
    let business_id = first_business_id(&anon).await;

    let before = business_detail(&anon, business_id).await;
    let count_before = before["review_count"].as_i64().expect("review_count");

    // Three fresh accounts leave 5, 4, 3.
    let mut review_ids = Vec::new();
    for rating in [5, 4, 3] {
        let ctx = TestContext::new();
        ctx.register_customer().await;
        let resp = ctx
            .client
            .post(ctx.url(&format!("/api/reviews/business/{business_id}")))
            .json(&json!({"rating": rating, "comment": "integration test"}))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.expect("review body");
        review_ids.push((ctx, body["id"].as_i64().expect("review id")));
    }

    let after = business_detail(&anon, business_id).await;
    assert_eq!(
        after["review_count"].as_i64(),
        Some(count_before + 3),
        "aggregate count must move with review writes"
    );
    if count_before == 0 {
        assert_eq!(after["rating"], json!("4.0"));
    }

    // Deleting the reviews restores the aggregate.
    for (ctx, id) in review_ids {
        let resp = ctx
            .client
            .delete(ctx.url(&format!("/api/reviews/{id}")))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let restored = business_detail(&anon, business_id).await;
    assert_eq!(restored["review_count"].as_i64(), Some(count_before));
    assert_eq!(restored["rating"], before["rating"]);
}

#[tokio::test]
#[ignore = "Requires running marketplace server and seed data"]
async fn second_review_of_same_target_conflicts() {
    let ctx = TestContext::new();
    ctx.register_customer().await;
    let business_id = first_business_id(&ctx).await;

    let resp = ctx
        .client
        .post(ctx.url(&format!("/api/reviews/business/{business_id}")))
        .json(&json!({"rating": 5, "comment": "first"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("review body");

    let resp = ctx
        .client
        .post(ctx.url(&format!("/api/reviews/business/{business_id}")))
        .json(&json!({"rating": 1, "comment": "second"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Cleanup so reruns start from the same state.
    let id = created["id"].as_i64().expect("review id");
    let _ = ctx
        .client
        .delete(ctx.url(&format!("/api/reviews/{id}")))
        .send()
        .await;
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn orders_require_a_session() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/api/orders"))
        .json(&json!({
            "product_id": 1,
            "quantity": 1,
            "pickup_at": "2030-01-01T10:00:00Z",
            "payment_method": "pay_at_pickup",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn checkout_confirm_requires_a_session() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/confirm"))
        .json(&json!({
            "target": "order",
            "reference": "order_ref",
            "payment_id": "pay_x",
            "signature": "0000",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
