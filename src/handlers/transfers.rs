use crate::entities::transfer::TransferStatus;
use crate::errors::ServiceError;
use crate::services::transfers::{CreateTransferInput, NewTransferItem, TransferRecord};
use crate::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct TransferListQuery {
    /// Filter by lifecycle status; omit or pass `all` for every transfer
    pub status: Option<String>,
    /// Free-text match on id, transfer number, notes, or store codes
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferItemRequest {
    pub item_num: String,
    pub item_name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransferRequest {
    pub from_store: String,
    pub to_store: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub items: Vec<TransferItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferItemResponse {
    pub id: Uuid,
    pub line_number: i32,
    pub item_num: String,
    pub item_name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    pub id: Uuid,
    pub transfer_number: String,
    pub from_store: String,
    pub to_store: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items: Vec<TransferItemResponse>,
}

impl From<TransferRecord> for TransferResponse {
    fn from(record: TransferRecord) -> Self {
        let transfer = record.transfer;
        Self {
            id: transfer.id,
            transfer_number: transfer.transfer_number,
            from_store: transfer.from_store_id,
            to_store: transfer.to_store_id,
            status: transfer.status,
            notes: transfer.notes,
            created_by: transfer.created_by,
            created_at: transfer.created_at,
            approved_at: transfer.approved_at,
            shipped_at: transfer.shipped_at,
            completed_at: transfer.completed_at,
            items: record
                .items
                .into_iter()
                .map(|item| TransferItemResponse {
                    id: item.id,
                    line_number: item.line_number,
                    item_num: item.item_num,
                    item_name: item.item_name,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

fn parse_status(raw: &str) -> Result<TransferStatus, ServiceError> {
    raw.parse().map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid status '{}'; expected one of pending, approved, in_transit, completed, cancelled",
            raw
        ))
    })
}

/// Create the transfers router
pub fn transfers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:id", get(get_transfer).delete(delete_transfer))
        .route("/:id/status", put(update_transfer_status))
}

/// List transfers newest-first with embedded line items
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    params(TransferListQuery),
    responses(
        (status = 200, description = "Transfer list returned", body = [TransferResponse]),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<TransferListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(parse_status(raw)?),
    };

    let records = state
        .services
        .transfers
        .list_transfers(status, query.search)
        .await?;

    let response: Vec<TransferResponse> = records.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(response)))
}

/// Get one transfer with its line items
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = Uuid, Path, description = "Transfer id")),
    responses(
        (status = 200, description = "Transfer returned", body = TransferResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.transfers.get_transfer(id).await?;
    Ok((StatusCode::OK, Json(TransferResponse::from(record))))
}

/// Create a transfer in `pending` with its line items
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer created", body = TransferResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .transfers
        .create_transfer(CreateTransferInput {
            from_store: payload.from_store,
            to_store: payload.to_store,
            notes: payload.notes,
            created_by: payload.created_by,
            items: payload
                .items
                .into_iter()
                .map(|item| NewTransferItem {
                    item_num: item.item_num,
                    item_name: item.item_name,
                    quantity: item.quantity,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TransferResponse::from(record))))
}

/// Request a status transition.
///
/// Legality is enforced server-side against the transition table; a
/// transition into `completed` settles stock at both stores before the
/// status is persisted.
#[utoipa::path(
    put,
    path = "/api/v1/transfers/{id}/status",
    params(("id" = Uuid, Path, description = "Transfer id")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transfer updated", body = TransferResponse),
        (status = 400, description = "Unknown status value", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Illegal transition", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn update_transfer_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let target = parse_status(&payload.status)?;
    let updated = state.services.transfers.update_status(id, target).await?;
    let items = state.services.transfers.get_transfer(id).await?.items;

    let response = TransferResponse::from(TransferRecord {
        transfer: updated,
        items,
    });
    Ok((StatusCode::OK, Json(response)))
}

/// Delete a transfer and its line items (refused once settled)
#[utoipa::path(
    delete,
    path = "/api/v1/transfers/{id}",
    params(("id" = Uuid, Path, description = "Transfer id")),
    responses(
        (status = 200, description = "Transfer deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transfer already settled", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn delete_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.transfers.delete_transfer(id).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
