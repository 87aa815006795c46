mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::TestApp;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, NotSet, Set};
use serde_json::json;
use stockroom_api::entities::{department, sync_log};

#[tokio::test]
async fn store_listing_reports_item_counts_and_sync_status() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/stores",
            json!({ "store_code": "STORE-A", "name": "Downtown" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(
            "/api/v1/stores",
            json!({ "store_code": "STORE-B", "name": "Airport" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.seed_inventory("STORE-A", "100", "Apple Juice", Decimal::from(3))
        .await;
    app.seed_inventory("STORE-A", "200", "Banana Bread", Decimal::from(4))
        .await;

    // Soft-deleted rows do not count toward the store's items.
    let dead = app
        .seed_inventory("STORE-A", "300", "Old Stock", Decimal::from(1))
        .await;
    app.delete(&format!("/api/v1/inventory/{dead}")).await;

    // One completed sync run for STORE-A only.
    let now = Utc::now();
    sync_log::ActiveModel {
        id: NotSet,
        store_id: Set("STORE-A".to_string()),
        sync_type: Set("inventory".to_string()),
        status: Set("completed".to_string()),
        started_at: Set(now),
        completed_at: Set(Some(now)),
        error_message: Set(None),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();

    let (status, body) = app.get("/api/v1/stores").await;
    assert_eq!(status, StatusCode::OK);
    let stores = body.as_array().unwrap();
    assert_eq!(stores.len(), 2);

    // Sorted by store name: Airport before Downtown.
    assert_eq!(stores[0]["store_code"], "STORE-B");
    assert_eq!(stores[0]["item_count"], 0);
    assert_eq!(stores[0]["sync_status"], "offline");

    assert_eq!(stores[1]["store_code"], "STORE-A");
    assert_eq!(stores[1]["item_count"], 2);
    assert_eq!(stores[1]["sync_status"], "online");
    assert!(!stores[1]["last_sync"].is_null());
}

#[tokio::test]
async fn duplicate_store_code_is_a_conflict() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/stores",
            json!({ "store_code": "STORE-A", "name": "Downtown" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/v1/stores",
            json!({ "store_code": "STORE-A", "name": "Downtown again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/api/v1/stores", json!({ "store_code": "", "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn departments_list_optionally_scoped_by_store() {
    let app = TestApp::new().await;

    for (dept, name, store) in [
        ("GROCERY", "Grocery", Some("STORE-A")),
        ("BEVERAGE", "Beverages", Some("STORE-A")),
        ("BAKERY", "Bakery", Some("STORE-B")),
    ] {
        department::ActiveModel {
            id: NotSet,
            dept_id: Set(dept.to_string()),
            dept_name: Set(name.to_string()),
            store_id: Set(store.map(str::to_string)),
        }
        .insert(&*app.state.db)
        .await
        .unwrap();
    }

    let (status, body) = app.get("/api/v1/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app.get("/api/v1/departments?store_id=STORE-A").await;
    assert_eq!(status, StatusCode::OK);
    let departments = body.as_array().unwrap();
    assert_eq!(departments.len(), 2);
    // Ordered by department code.
    assert_eq!(departments[0]["dept_id"], "BEVERAGE");
    assert_eq!(departments[1]["dept_id"], "GROCERY");
}
