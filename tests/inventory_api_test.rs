mod common;

use axum::http::StatusCode;
use common::TestApp;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn multi_store_create_reports_partial_success() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(4))
        .await;

    // The item already exists at STORE-A: creation succeeds at STORE-B only
    // and the response is a 207 carrying both outcomes.
    let (status, body) = app
        .post(
            "/api/v1/inventory",
            json!({
                "item_num": "123",
                "item_name": "Cola 330ml",
                "store_ids": ["STORE-A", "STORE-B"],
                "in_stock": 12,
                "price": 2.99
            }),
        )
        .await;
    assert_eq!(status, StatusCode::MULTI_STATUS, "got: {body}");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["store_id"], "STORE-B");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("STORE-A"));

    assert_eq!(
        app.stock_at("STORE-B", "123").await,
        Some(Decimal::from(12))
    );

    // Every requested store conflicting collapses to a 409.
    let (status, _) = app
        .post(
            "/api/v1/inventory",
            json!({
                "item_num": "123",
                "item_name": "Cola 330ml",
                "store_ids": ["STORE-A", "STORE-B"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_in_all_new_stores_returns_created() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/inventory",
            json!({
                "item_num": "789",
                "item_name": "Sparkling Water",
                "store_ids": ["STORE-A", "STORE-B"],
                "dept_id": "BEVERAGE",
                "in_stock": 24,
                "cost": 0.80,
                "price": 1.50
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "got: {body}");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    // Price keeps retail_price aligned on create.
    let record = app.inventory_at("STORE-A", "789").await.unwrap();
    assert_eq!(record.price, record.retail_price);
    assert_eq!(record.dept_id, "BEVERAGE");
}

#[tokio::test]
async fn create_requires_item_number_and_store() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/inventory",
            json!({ "item_name": "No number", "store_ids": ["STORE-A"], "item_num": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/inventory",
            json!({ "item_num": "42", "item_name": "No store" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn soft_delete_hides_from_listing_but_keeps_the_row() {
    let app = TestApp::new().await;
    let id = app
        .seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;
    let before = app.inventory_at("STORE-A", "123").await.unwrap();

    let (status, body) = app.delete(&format!("/api/v1/inventory/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Excluded from every listing...
    let (status, body) = app.get("/api/v1/inventory?store=STORE-A").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());

    // ...but a direct lookup still returns the tombstone with a fresh
    // updated_at for the sync agent to observe.
    let (status, body) = app.get(&format!("/api/v1/inventory/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_name"], "DELETED");

    let after = app.inventory_at("STORE-A", "123").await.unwrap();
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn partial_update_stamps_updated_at_and_aligns_retail_price() {
    let app = TestApp::new().await;
    let id = app
        .seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;
    let before = app.inventory_at("STORE-A", "123").await.unwrap();

    let (status, body) = app
        .patch(
            &format!("/api/v1/inventory/{id}"),
            json!({ "in_stock": 7, "price": 3.49 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "got: {body}");

    let after = app.inventory_at("STORE-A", "123").await.unwrap();
    assert_eq!(after.in_stock, Decimal::from(7));
    assert_eq!(after.price, Decimal::new(349, 2));
    assert_eq!(after.retail_price, Decimal::new(349, 2));
    // Untouched fields survive.
    assert_eq!(after.item_name, "Cola 330ml");
    assert!(after.updated_at > before.updated_at);

    // An empty patch is rejected before any mutation.
    let (status, _) = app.patch(&format!("/api/v1/inventory/{id}"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_record_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .patch(
            &format!("/api/v1/inventory/{}", uuid::Uuid::new_v4()),
            json!({ "in_stock": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_and_paginates() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "100", "Apple Juice", Decimal::from(3))
        .await;
    app.seed_inventory("STORE-A", "200", "Banana Bread", Decimal::from(40))
        .await;
    app.seed_inventory("STORE-B", "300", "Apple Cider", Decimal::from(15))
        .await;

    // Store filter
    let (status, body) = app.get("/api/v1/inventory?store=STORE-A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_items"], 2);

    // Low-stock filter (threshold 10)
    let (status, body) = app.get("/api/v1/inventory?lowStock=true").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_num"], "100");

    // Search matches name or number, sorted by item name ascending
    let (status, body) = app.get("/api/v1/inventory?search=Apple").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["item_name"], "Apple Cider");
    assert_eq!(items[1]["item_name"], "Apple Juice");

    // Pagination metadata
    let (status, body) = app.get("/api/v1/inventory?page=1&pageSize=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_items"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["pagination"]["has_more"], true);

    let (status, body) = app.get("/api/v1/inventory?page=2&pageSize=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["has_more"], false);
}

#[tokio::test]
async fn get_unknown_inventory_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .get(&format!("/api/v1/inventory/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
