use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db,
    entities::inventory,
    events,
    handlers::AppServices,
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive for
        // the harness lifetime.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_sender, event_rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg.cache);
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", stockroom_api::api_v1_routes())
            .layer(axum::middleware::from_fn(
                stockroom_api::request_ctx::request_id_middleware,
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Issue a request against the router and decode the JSON response body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Seed one inventory record directly into the database.
    pub async fn seed_inventory(
        &self,
        store_id: &str,
        item_num: &str,
        item_name: &str,
        in_stock: Decimal,
    ) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let record = inventory::ActiveModel {
            id: Set(id),
            item_num: Set(item_num.to_string()),
            item_name: Set(item_name.to_string()),
            store_id: Set(store_id.to_string()),
            dept_id: Set("GROCERY".to_string()),
            item_type: Set(0),
            in_stock: Set(in_stock),
            cost: Set(dec!(1.50)),
            price: Set(dec!(2.99)),
            retail_price: Set(dec!(2.99)),
            last_synced_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        record
            .insert(&*self.state.db)
            .await
            .expect("failed to seed inventory");
        id
    }

    /// Read the current stock for a `(store, item)` pair, if a record exists.
    pub async fn stock_at(&self, store_id: &str, item_num: &str) -> Option<Decimal> {
        inventory::Entity::find()
            .filter(inventory::Column::StoreId.eq(store_id))
            .filter(inventory::Column::ItemNum.eq(item_num))
            .one(&*self.state.db)
            .await
            .expect("failed to query inventory")
            .map(|record| record.in_stock)
    }

    /// Fetch a full inventory row by `(store, item)`.
    pub async fn inventory_at(&self, store_id: &str, item_num: &str) -> Option<inventory::Model> {
        inventory::Entity::find()
            .filter(inventory::Column::StoreId.eq(store_id))
            .filter(inventory::Column::ItemNum.eq(item_num))
            .one(&*self.state.db)
            .await
            .expect("failed to query inventory")
    }
}
