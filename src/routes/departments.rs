use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{clean_name, parse_id, MessageResponse};
use crate::app::AppState;
use crate::authz::{AdminOnly, Authorized};
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::events::log_activity;
use crate::extract::ValidJson;
use crate::models::department::{Department, DepartmentCreateRequest, DepartmentUpdateRequest};

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    security(()),
    responses((status = 200, description = "All departments, by name", body = [Department]))
)]
pub async fn list_departments(State(state): State<AppState>) -> AppResult<Json<Vec<Department>>> {
    Ok(Json(db::departments::list(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(()),
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department detail", body = Department),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_department(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Department>> {
    let id = parse_id(&id, "department")?;
    db::departments::get(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Department not found"))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    request_body = DepartmentCreateRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_department(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    ValidJson(payload): ValidJson<DepartmentCreateRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    let name = clean_name(payload.name.as_deref()).ok_or_else(|| AppError::bad_request("Missing required field: name"))?;

    let department = db::departments::create(&state.pool, &name).await?;
    tracing::info!(department_id = department.id, %name, "department created");
    log_activity(&state.event_bus, "created", Some(auth.user_id()), &department, None);

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    patch,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = i64, Path, description = "Department id")),
    request_body = DepartmentUpdateRequest,
    responses(
        (status = 200, description = "Department renamed", body = Department),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_department(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<DepartmentUpdateRequest>,
) -> AppResult<Json<Department>> {
    let id = parse_id(&id, "department")?;
    let name = clean_name(payload.name.as_deref()).ok_or_else(|| AppError::bad_request("Missing required field: name"))?;

    let before = db::departments::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;
    let department = db::departments::update(&state.pool, id, &name)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    log_activity(&state.event_bus, "updated", Some(auth.user_id()), &department, Some(&before));
    Ok(Json(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department deleted", body = MessageResponse),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Still referenced by roles or profiles", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_department(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, "department")?;
    let existing = db::departments::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    if !db::departments::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Department not found"));
    }

    tracing::info!(department_id = id, "department deleted");
    log_activity(&state.event_bus, "deleted", Some(auth.user_id()), &existing, None);
    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
