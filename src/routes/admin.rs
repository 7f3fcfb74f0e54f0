use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use super::{clean_name, ensure_assignable};
use crate::app::AppState;
use crate::authz::{approval_after_edit, audit_action, AdminOnly, Authorized, Editor, ProfileStatus};
use crate::db;
use crate::db::profiles::ProfileChanges;
use crate::errors::{AppError, AppResult};
use crate::events::log_activity;
use crate::extract::ValidJson;
use crate::models::profile::{AdminProfileUpdateRequest, Profile};

#[utoipa::path(
    get,
    path = "/api/admin/profiles",
    tag = "Admin",
    responses(
        (status = 200, description = "Every profile with its role and department", body = [Profile]),
        (status = 403, description = "Caller is not SUPER_ADMIN", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_profiles(State(state): State<AppState>, _auth: Authorized<AdminOnly>) -> AppResult<Json<Vec<Profile>>> {
    Ok(Json(db::profiles::list(&state.pool).await?))
}

/// Approval toggle and reassignment. Admin edits never revoke approval on
/// their own.
#[utoipa::path(
    patch,
    path = "/api/admin/profiles/{user_id}",
    tag = "Admin",
    params(("user_id" = Uuid, Path, description = "Owner of the profile")),
    request_body = AdminProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "No fields, or unknown department/role", body = crate::errors::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(user_id): Path<String>,
    ValidJson(payload): ValidJson<AdminProfileUpdateRequest>,
) -> AppResult<Json<Profile>> {
    let user_id = Uuid::parse_str(user_id.trim()).map_err(|_| AppError::bad_request("Invalid user ID"))?;

    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }

    let name = match payload.name.as_deref() {
        Some(raw) => Some(clean_name(Some(raw)).ok_or_else(|| AppError::bad_request("name cannot be empty"))?),
        None => None,
    };
    ensure_assignable(&state.pool, payload.department_id, payload.role_id).await?;

    let before = db::profiles::find_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let changes = ProfileChanges {
        name,
        department_id: payload.department_id,
        role_id: payload.role_id,
        approved: approval_after_edit(Editor::Admin, payload.approved),
    };
    let updated = db::profiles::update(&state.pool, user_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let action = audit_action(
        ProfileStatus::of(Some(&before)).state(),
        ProfileStatus::of(Some(&updated)).state(),
    );
    tracing::info!(
        admin_id = %auth.user_id(),
        %user_id,
        approved = updated.approved,
        action,
        "profile updated by admin"
    );
    log_activity(&state.event_bus, action, Some(auth.user_id()), &updated, Some(&before));

    Ok(Json(updated))
}
