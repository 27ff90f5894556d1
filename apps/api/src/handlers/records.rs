use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use wardgate_application::RequestContext;
use wardgate_core::AppError;
use wardgate_domain::{Permission, Resource, RowId, UpdateRequest};

use crate::dto::{CapabilityResponse, DashboardTableResponse, RecordResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordListQuery {
    pub limit: Option<u32>,
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> ApiResult<Json<Vec<DashboardTableResponse>>> {
    let tables = state
        .record_service
        .dashboard(&context)
        .await?
        .into_iter()
        .map(DashboardTableResponse::from)
        .collect();

    Ok(Json(tables))
}

pub async fn capabilities_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Json<Vec<CapabilityResponse>> {
    Json(
        state
            .record_service
            .capabilities(&context)
            .into_iter()
            .map(|(resource, permissions)| CapabilityResponse::new(resource, permissions))
            .collect(),
    )
}

pub async fn list_records_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(resource): Path<String>,
    Query(query): Query<RecordListQuery>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    let resource = Resource::from_str(resource.as_str())?;
    let records = state
        .record_service
        .list_records(&context, resource, query.limit)
        .await?
        .into_iter()
        .map(|record| RecordResponse::new(resource, record))
        .collect();

    Ok(Json(records))
}

pub async fn get_record_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path((resource, row_id)): Path<(String, String)>,
) -> ApiResult<Json<RecordResponse>> {
    let (resource, row_id) =
        parse_target(&state, &context, &resource, &row_id, Permission::Read)?;
    let record = state
        .record_service
        .get_record(&context, resource, row_id)
        .await?;

    Ok(Json(RecordResponse::new(resource, record)))
}

pub async fn update_record_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path((resource, row_id)): Path<(String, String)>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<RecordResponse>> {
    let (resource, row_id) =
        parse_target(&state, &context, &resource, &row_id, Permission::Write)?;
    let update = update_request_from_json(payload)?;
    let record = state
        .record_service
        .update_record(&context, resource, row_id, update)
        .await?;

    Ok(Json(RecordResponse::new(resource, record)))
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path((resource, row_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let (resource, row_id) =
        parse_target(&state, &context, &resource, &row_id, Permission::Delete)?;
    state
        .record_service
        .delete_record(&context, resource, row_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the path target. The permission check runs before the row id and
/// payload are validated, so a forbidden request is always reported as such.
fn parse_target(
    state: &AppState,
    context: &RequestContext,
    resource: &str,
    row_id: &str,
    permission: Permission,
) -> Result<(Resource, RowId), AppError> {
    let resource = Resource::from_str(resource)?;
    state
        .record_service
        .require_permission(context, resource, permission)?;
    Ok((resource, RowId::from_str(row_id)?))
}

/// Converts a submitted JSON object into raw column assignments.
///
/// Scalars are passed on as text and typed later against the column
/// definition. `null` becomes the empty string, which clears a nullable
/// column and is rejected on a required one.
fn update_request_from_json(payload: Map<String, Value>) -> Result<UpdateRequest, AppError> {
    payload
        .into_iter()
        .try_fold(UpdateRequest::new(), |update, (column, value)| {
            let raw = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(AppError::InvalidInput(format!(
                        "column '{column}' expects a scalar value, got {other}"
                    )));
                }
            };
            Ok(update.with(column, raw))
        })
}
