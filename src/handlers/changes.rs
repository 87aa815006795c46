use crate::entities::inventory_change::ChangeType;
use crate::errors::ServiceError;
use crate::services::changes::{ChangeFilters, NewChangeEntry};
use crate::AppState;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ChangeListQuery {
    pub store: Option<String>,
    /// Change type filter; omit or pass `all` for every type
    #[serde(rename = "type")]
    pub change_type: Option<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD` (extends to end of day)
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordChangeRequest {
    pub item_num: String,
    pub item_name: String,
    pub store_id: String,
    pub change_type: String,
    pub quantity_change: Decimal,
    pub old_stock: Decimal,
    pub new_stock: Decimal,
    pub transfer_id: Option<Uuid>,
    pub notes: Option<String>,
}

fn parse_change_type(raw: &str) -> Result<ChangeType, ServiceError> {
    raw.parse().map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid change type '{}'; expected one of transfer_out, transfer_in, adjustment, sale, receipt",
            raw
        ))
    })
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    raw.parse().map_err(|_| {
        ServiceError::ValidationError(format!("Invalid {} '{}'; expected YYYY-MM-DD", field, raw))
    })
}

/// Create the change-ledger router
pub fn changes_router() -> Router<AppState> {
    Router::new().route("/", get(list_changes).post(record_change))
}

/// List ledger entries newest-first (capped result size)
#[utoipa::path(
    get,
    path = "/api/v1/reports/changes",
    params(ChangeListQuery),
    responses(
        (status = 200, description = "Ledger entries returned"),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "changes"
)]
pub async fn list_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangeListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let change_type = match query.change_type.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(parse_change_type(raw)?),
    };

    let start_date: Option<DateTime<Utc>> = query
        .start_date
        .as_deref()
        .map(|raw| parse_date(raw, "start date"))
        .transpose()?
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());
    let end_date: Option<DateTime<Utc>> = query
        .end_date
        .as_deref()
        .map(|raw| parse_date(raw, "end date"))
        .transpose()?
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc());

    let entries = state
        .services
        .changes
        .list_changes(ChangeFilters {
            store: query.store,
            change_type,
            start_date,
            end_date,
        })
        .await?;

    Ok((StatusCode::OK, Json(entries)))
}

/// Append a ledger entry
#[utoipa::path(
    post,
    path = "/api/v1/reports/changes",
    request_body = RecordChangeRequest,
    responses(
        (status = 201, description = "Ledger entry recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "changes"
)]
pub async fn record_change(
    State(state): State<AppState>,
    Json(payload): Json<RecordChangeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let change_type = parse_change_type(&payload.change_type)?;

    let created = state
        .services
        .changes
        .record_change(NewChangeEntry {
            item_num: payload.item_num,
            item_name: payload.item_name,
            store_id: payload.store_id,
            change_type,
            quantity_change: payload.quantity_change,
            old_stock: payload.old_stock,
            new_stock: payload.new_stock,
            transfer_id: payload.transfer_id,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
