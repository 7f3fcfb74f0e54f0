use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{clean_name, parse_id, MessageResponse};
use crate::app::AppState;
use crate::authz::{AdminOnly, Authorized, RoleLevel};
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::events::log_activity;
use crate::extract::ValidJson;
use crate::models::role::{Role, RoleCreateRequest, RoleUpdateRequest};

fn check_level(level: i64) -> AppResult<()> {
    if level > RoleLevel::SuperAdmin.value() {
        return Err(AppError::bad_request("Role level cannot exceed SUPER_ADMIN"));
    }
    Ok(())
}

async fn require_department(state: &AppState, department_id: i64) -> AppResult<()> {
    db::departments::get(&state.pool, department_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Department not found"))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    security(()),
    responses((status = 200, description = "All roles with their department, by name", body = [Role]))
)]
pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(db::roles::list(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Roles",
    security(()),
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role detail", body = Role),
        (status = 404, description = "Role not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_role(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Role>> {
    let id = parse_id(&id, "role")?;
    db::roles::get(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Role not found"))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    request_body = RoleCreateRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Missing fields or level above SUPER_ADMIN", body = crate::errors::ErrorResponse),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    ValidJson(payload): ValidJson<RoleCreateRequest>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let (name, level, department_id) = match (clean_name(payload.name.as_deref()), payload.level, payload.department_id) {
        (Some(name), Some(level), Some(department_id)) => (name, level, department_id),
        _ => return Err(AppError::bad_request("Missing required fields: name, level, departmentId")),
    };

    require_department(&state, department_id).await?;
    check_level(level)?;

    let role = db::roles::create(&state.pool, &name, level, department_id).await?;
    tracing::info!(role_id = role.id, %name, level, "role created");
    log_activity(&state.event_bus, "created", Some(auth.user_id()), &role, None);

    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    patch,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "No fields or level above SUPER_ADMIN", body = crate::errors::ErrorResponse),
        (status = 404, description = "Role or department not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(id): Path<String>,
    ValidJson(mut payload): ValidJson<RoleUpdateRequest>,
) -> AppResult<Json<Role>> {
    let id = parse_id(&id, "role")?;
    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    if let Some(raw) = payload.name.take() {
        payload.name = Some(clean_name(Some(&raw)).ok_or_else(|| AppError::bad_request("name cannot be empty"))?);
    }
    if let Some(level) = payload.level {
        check_level(level)?;
    }
    if let Some(department_id) = payload.department_id {
        require_department(&state, department_id).await?;
    }

    let before = db::roles::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Role not found"))?;
    let role = db::roles::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Role not found"))?;

    log_activity(&state.event_bus, "updated", Some(auth.user_id()), &role, Some(&before));
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted", body = MessageResponse),
        (status = 404, description = "Role not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Role still assigned to profiles", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, "role")?;
    let existing = db::roles::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Role not found"))?;

    if !db::roles::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Role not found"));
    }

    tracing::info!(role_id = id, "role deleted");
    log_activity(&state.event_bus, "deleted", Some(auth.user_id()), &existing, None);
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}
