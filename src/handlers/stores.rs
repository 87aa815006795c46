use crate::errors::ServiceError;
use crate::services::stores::{CreateStoreInput, StoreSummary};
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, message = "Store code is required"))]
    pub store_code: String,
    #[validate(length(min = 1, message = "Store name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
}

/// Create the stores router
pub fn stores_router() -> Router<AppState> {
    Router::new().route("/", get(list_stores).post(create_store))
}

/// List stores enriched with item counts and sync status
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    responses(
        (status = 200, description = "Store list returned", body = [StoreSummary])
    ),
    tag = "stores"
)]
pub async fn list_stores(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let stores = state.services.stores.list_stores().await?;
    Ok((StatusCode::OK, Json(stores)))
}

/// Register a new store
#[utoipa::path(
    post,
    path = "/api/v1/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Store code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let created = state
        .services
        .stores
        .create_store(CreateStoreInput {
            store_code: payload.store_code,
            name: payload.name,
            address: payload.address,
            phone: payload.phone,
            manager: payload.manager,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
