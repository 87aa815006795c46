use crate::errors::ServiceError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DepartmentListQuery {
    pub store_id: Option<String>,
}

pub fn departments_router() -> Router<AppState> {
    Router::new().route("/", get(list_departments))
}

/// List departments, optionally scoped to one store
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    params(DepartmentListQuery),
    responses((status = 200, description = "Department list returned")),
    tag = "departments"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    Query(query): Query<DepartmentListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let departments = state
        .services
        .departments
        .list_departments(query.store_id)
        .await?;
    Ok((StatusCode::OK, Json(departments)))
}
