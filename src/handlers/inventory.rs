use crate::errors::ServiceError;
use crate::services::inventory::{
    CreateInventoryInput, InventoryFilters, InventoryPage, UpdateInventoryInput, DEFAULT_PAGE_SIZE,
};
use crate::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListQuery {
    pub store: Option<String>,
    pub search: Option<String>,
    pub low_stock: Option<bool>,
    pub department: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRequest {
    #[validate(length(min = 1, message = "Item number is required"))]
    pub item_num: String,
    pub item_name: Option<String>,
    /// Create the item in each of these stores; falls back to `store_id`.
    pub store_ids: Option<Vec<String>>,
    pub store_id: Option<String>,
    pub dept_id: Option<String>,
    pub item_type: Option<i32>,
    pub in_stock: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInventoryRequest {
    pub item_name: Option<String>,
    pub dept_id: Option<String>,
    pub item_type: Option<i32>,
    pub in_stock: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

/// Create the inventory router
pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route(
            "/:id",
            get(get_inventory)
                .patch(update_inventory)
                .delete(delete_inventory),
        )
}

/// List inventory items with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryListQuery),
    responses(
        (status = 200, description = "Inventory list returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filters = InventoryFilters {
        store: query.store,
        search: query.search,
        low_stock: query.low_stock.unwrap_or(false),
        department: query.department,
        price_min: query.price_min,
        price_max: query.price_max,
    };

    let page: InventoryPage = state
        .services
        .inventory
        .list_inventory(
            filters,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let response = json!({
        "items": page.items,
        "pagination": PaginationMeta {
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            has_more: page.has_more,
        }
    });

    Ok((StatusCode::OK, Json(response)))
}

/// Get one inventory record by id (soft-deleted rows included)
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory record id")),
    responses(
        (status = 200, description = "Inventory record returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.inventory.get_inventory(id).await?;
    Ok((StatusCode::OK, Json(record)))
}

/// Create an inventory item in one or many stores.
///
/// Mirrors the multi-store semantics: all stores succeed -> 201, a mix of
/// successes and duplicates -> 207 with both lists, nothing created -> 409.
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Item created in all stores"),
        (status = 207, description = "Item created in some stores"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate item", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    Json(payload): Json<CreateInventoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let store_ids = match (&payload.store_ids, &payload.store_id) {
        (Some(ids), _) if !ids.is_empty() => ids.clone(),
        (_, Some(id)) => vec![id.clone()],
        _ => {
            return Err(ServiceError::ValidationError(
                "At least one store is required".to_string(),
            ))
        }
    };

    let outcome = state
        .services
        .inventory
        .create_inventory(CreateInventoryInput {
            item_num: payload.item_num,
            item_name: payload.item_name.unwrap_or_else(|| "New Item".to_string()),
            store_ids,
            dept_id: payload.dept_id,
            item_type: payload.item_type,
            in_stock: payload.in_stock,
            cost: payload.cost,
            price: payload.price,
        })
        .await?;

    if outcome.created.is_empty() {
        return Err(ServiceError::Conflict(outcome.errors.join(", ")));
    }

    if !outcome.errors.is_empty() {
        let response = json!({
            "message": "Item created with some errors",
            "results": outcome.created,
            "errors": outcome.errors,
        });
        return Ok((StatusCode::MULTI_STATUS, Json(response)));
    }

    let response = json!({
        "message": "Item created successfully in all selected stores",
        "results": outcome.created,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

/// Partially update an inventory record. `updated_at` is always refreshed.
#[utoipa::path(
    patch,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory record id")),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory record updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .inventory
        .update_inventory(
            id,
            UpdateInventoryInput {
                item_name: payload.item_name,
                dept_id: payload.dept_id,
                item_type: payload.item_type,
                in_stock: payload.in_stock,
                cost: payload.cost,
                price: payload.price,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}

/// Soft-delete an inventory record (sentinel rename, row retained)
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory record id")),
    responses(
        (status = 200, description = "Inventory record soft-deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.inventory.soft_delete_inventory(id).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
