mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter, Statement};
use serde_json::{json, Value};
use stockroom_api::entities::{inventory_change, transfer, transfer_item};
use uuid::Uuid;

fn transfer_body(from: &str, to: &str, items: Value) -> Value {
    json!({
        "from_store": from,
        "to_store": to,
        "notes": "weekly rebalance",
        "items": items,
    })
}

async fn create_transfer(app: &TestApp, from: &str, to: &str, items: Value) -> Uuid {
    let (status, body) = app
        .post("/api/v1/transfers", transfer_body(from, to, items))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn transition(app: &TestApp, id: Uuid, target: &str) -> (StatusCode, Value) {
    app.put(
        &format!("/api/v1/transfers/{id}/status"),
        json!({ "status": target }),
    )
    .await
}

#[tokio::test]
async fn completed_transfer_settles_both_stores_and_creates_missing_sku() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;

    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
    )
    .await;

    let (status, body) = transition(&app, id, "approved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert!(!body["approved_at"].is_null());

    let (status, body) = transition(&app, id, "in_transit").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["shipped_at"].is_null());

    let (status, body) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(!body["completed_at"].is_null());

    // Source decremented, destination originated with the transferred stock.
    assert_eq!(app.stock_at("STORE-A", "123").await, Some(Decimal::from(5)));
    let created = app.inventory_at("STORE-B", "123").await.expect("new SKU");
    assert_eq!(created.in_stock, Decimal::from(5));
    assert_eq!(created.item_name, "Cola 330ml");
    assert_eq!(created.dept_id, "NONE");
    assert_eq!(created.cost, Decimal::ZERO);
    assert_eq!(created.price, Decimal::ZERO);

    // One transfer_out at the source and one transfer_in at the destination,
    // both carrying old/new stock and the transfer back-reference.
    let entries = inventory_change::Entity::find()
        .filter(inventory_change::Column::TransferId.eq(id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let out = entries
        .iter()
        .find(|e| e.change_type == "transfer_out")
        .expect("transfer_out entry");
    assert_eq!(out.store_id, "STORE-A");
    assert_eq!(out.quantity_change, Decimal::from(-5));
    assert_eq!(out.old_stock, Decimal::from(10));
    assert_eq!(out.new_stock, Decimal::from(5));

    let inbound = entries
        .iter()
        .find(|e| e.change_type == "transfer_in")
        .expect("transfer_in entry");
    assert_eq!(inbound.store_id, "STORE-B");
    assert_eq!(inbound.quantity_change, Decimal::from(5));
    assert_eq!(inbound.old_stock, Decimal::ZERO);
    assert_eq!(inbound.new_stock, Decimal::from(5));
}

#[tokio::test]
async fn over_transfer_drives_source_stock_negative() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(3))
        .await;

    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
    )
    .await;

    transition(&app, id, "approved").await;
    transition(&app, id, "in_transit").await;
    let (status, _) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::OK);

    // Not clamped at zero.
    assert_eq!(
        app.stock_at("STORE-A", "123").await,
        Some(Decimal::from(-2))
    );
    assert_eq!(app.stock_at("STORE-B", "123").await, Some(Decimal::from(5)));
}

#[tokio::test]
async fn cancelled_transfer_cannot_complete_and_touches_no_stock() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;

    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
    )
    .await;

    let (status, _) = transition(&app, id, "cancelled").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT, "got: {body}");

    assert_eq!(
        app.stock_at("STORE-A", "123").await,
        Some(Decimal::from(10))
    );
    assert_eq!(app.stock_at("STORE-B", "123").await, None);
}

#[tokio::test]
async fn settlement_runs_at_most_once() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;

    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
    )
    .await;

    transition(&app, id, "approved").await;
    transition(&app, id, "in_transit").await;
    let (status, _) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::OK);

    // A second completion request is refused outright, never re-run.
    let (status, _) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(app.stock_at("STORE-A", "123").await, Some(Decimal::from(5)));
    assert_eq!(app.stock_at("STORE-B", "123").await, Some(Decimal::from(5)));

    let ledger_count = inventory_change::Entity::find()
        .filter(inventory_change::Column::TransferId.eq(id))
        .all(&*app.state.db)
        .await
        .unwrap()
        .len();
    assert_eq!(ledger_count, 2);
}

#[tokio::test]
async fn shortcut_transitions_are_rejected() {
    let app = TestApp::new().await;

    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 1 }]),
    )
    .await;

    // pending -> completed and pending -> in_transit skip the chain.
    let (status, _) = transition(&app, id, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = transition(&app, id, "in_transit").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown status values are a validation error, not a transition error.
    let (status, _) = transition(&app, id, "shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_validations_reject_bad_input() {
    let app = TestApp::new().await;

    // Same-store route
    let (status, _) = app
        .post(
            "/api/v1/transfers",
            transfer_body(
                "STORE-A",
                "STORE-A",
                json!([{ "item_num": "1", "item_name": "x", "quantity": 1 }]),
            ),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty item list
    let (status, _) = app
        .post(
            "/api/v1/transfers",
            transfer_body("STORE-A", "STORE-B", json!([])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Non-positive quantity
    let (status, _) = app
        .post(
            "/api/v1/transfers",
            transfer_body(
                "STORE-A",
                "STORE-B",
                json!([{ "item_num": "1", "item_name": "x", "quantity": 0 }]),
            ),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing persisted by any of the rejected attempts.
    let headers = transfer::Entity::find().all(&*app.state.db).await.unwrap();
    assert!(headers.is_empty());
}

#[tokio::test]
async fn failed_line_item_insert_leaves_no_orphan_header() {
    let app = TestApp::new().await;
    let db = &*app.state.db;

    // Capture the table definition, then drop it so every line-item insert
    // fails after the header is written.
    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT sql FROM sqlite_master WHERE type='table' AND name='transfer_items'"
                .to_string(),
        ))
        .await
        .unwrap()
        .expect("transfer_items schema");
    let schema: String = row.try_get("", "sql").unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "DROP TABLE transfer_items".to_string(),
    ))
    .await
    .unwrap();

    let (status, _) = app
        .post(
            "/api/v1/transfers",
            transfer_body(
                "STORE-A",
                "STORE-B",
                json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
            ),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The compensating delete must have removed the half-created header.
    let headers = transfer::Entity::find().all(db).await.unwrap();
    assert!(headers.is_empty(), "orphan header survived: {headers:?}");

    // Restore the table; creation works again end to end.
    db.execute(Statement::from_string(DatabaseBackend::Sqlite, schema))
        .await
        .unwrap();
    let id = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 5 }]),
    )
    .await;
    let items = transfer_item::Entity::find()
        .filter(transfer_item::Column::TransferId.eq(id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn delete_cascades_items_but_refuses_settled_transfers() {
    let app = TestApp::new().await;
    app.seed_inventory("STORE-A", "123", "Cola 330ml", Decimal::from(10))
        .await;

    // Pending transfers delete cleanly, items included.
    let pending = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 2 }]),
    )
    .await;
    let (status, body) = app.delete(&format!("/api/v1/transfers/{pending}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let leftover = transfer_item::Entity::find()
        .filter(transfer_item::Column::TransferId.eq(pending))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert!(leftover.is_empty());

    // Settled transfers are refused; their ledger entries stay put.
    let settled = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 2 }]),
    )
    .await;
    transition(&app, settled, "approved").await;
    transition(&app, settled, "in_transit").await;
    transition(&app, settled, "completed").await;

    let (status, _) = app.delete(&format!("/api/v1/transfers/{settled}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let entries = inventory_change::Entity::find()
        .filter(inventory_change::Column::TransferId.eq(settled))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn listing_filters_by_status_and_search() {
    let app = TestApp::new().await;

    let first = create_transfer(
        &app,
        "STORE-A",
        "STORE-B",
        json!([{ "item_num": "123", "item_name": "Cola 330ml", "quantity": 1 }]),
    )
    .await;
    let second = create_transfer(
        &app,
        "STORE-B",
        "STORE-C",
        json!([{ "item_num": "456", "item_name": "Chips", "quantity": 2 }]),
    )
    .await;
    transition(&app, second, "approved").await;

    let (status, body) = app.get("/api/v1/transfers?status=pending").await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], first.to_string());
    assert_eq!(listed[0]["items"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/v1/transfers?search=store-c").await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], second.to_string());

    // Transfer numbers carry the readable prefix.
    assert!(listed[0]["transfer_number"]
        .as_str()
        .unwrap()
        .starts_with("TRF-"));
}

#[tokio::test]
async fn transition_on_unknown_transfer_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/transfers/{}/status", Uuid::new_v4()),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
