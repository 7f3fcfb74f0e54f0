use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{clean_name, ensure_assignable};
use crate::app::AppState;
use crate::authz::{
    approval_after_edit, audit_action, Authorized, Editor, ProfileCreation, ProfileEvent, ProfileStatus,
    SelfServiceProfile, SelfServiceRead,
};
use crate::db;
use crate::db::profiles::ProfileChanges;
use crate::errors::{AppError, AppResult, ReasonCode};
use crate::events::log_activity;
use crate::extract::ValidJson;
use crate::models::profile::{Profile, ProfileCreateRequest, ProfileUpdateRequest};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Caller's profile, or null before one exists", body = Profile),
        (status = 401, description = "No valid session", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_profile(auth: Authorized<SelfServiceRead>) -> AppResult<Json<Option<Profile>>> {
    tracing::debug!(user_id = %auth.user_id(), found = auth.profile.is_some(), "profile snapshot");
    Ok(Json(auth.ctx.profile))
}

#[utoipa::path(
    post,
    path = "/api/profile",
    tag = "Profile",
    request_body = ProfileCreateRequest,
    responses(
        (status = 201, description = "Profile created, awaiting approval", body = Profile),
        (status = 400, description = "Missing fields or unknown department/role", body = crate::errors::ErrorResponse),
        (status = 409, description = "Profile already exists", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_profile(
    State(state): State<AppState>,
    auth: Authorized<ProfileCreation>,
    ValidJson(payload): ValidJson<ProfileCreateRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let user_id = auth.user_id();

    if auth.status.state().on(ProfileEvent::Created).is_none() {
        tracing::warn!(%user_id, "profile creation attempted but profile already exists");
        return Err(AppError::conflict(
            ReasonCode::ProfileAlreadyExists,
            "Profile already exists for this user",
        ));
    }

    let (name, department_id, role_id) = match (clean_name(payload.name.as_deref()), payload.department_id, payload.role_id) {
        (Some(name), Some(department_id), Some(role_id)) => (name, department_id, role_id),
        _ => return Err(AppError::bad_request("Missing required fields: name, departmentId, roleId")),
    };

    ensure_assignable(&state.pool, Some(department_id), Some(role_id)).await?;

    let profile = db::profiles::create(&state.pool, user_id, &name, department_id, role_id).await?;
    tracing::info!(%user_id, "profile created");
    log_activity(&state.event_bus, "created", Some(user_id), &profile, None);

    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    tag = "Profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated; approval is cleared", body = Profile),
        (status = 400, description = "No fields to update", body = crate::errors::ErrorResponse),
        (status = 404, description = "Caller has no profile", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: Authorized<SelfServiceProfile>,
    ValidJson(payload): ValidJson<ProfileUpdateRequest>,
) -> AppResult<Json<Profile>> {
    let user_id = auth.user_id();
    let Some(before) = auth.profile.as_ref() else {
        tracing::warn!(%user_id, "profile update without a profile");
        return Err(AppError::not_found("Profile not found"));
    };

    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }

    let name = match payload.name.as_deref() {
        Some(raw) => Some(clean_name(Some(raw)).ok_or_else(|| AppError::bad_request("name cannot be empty"))?),
        None => None,
    };
    ensure_assignable(&state.pool, payload.department_id, payload.role_id).await?;

    let changes = ProfileChanges {
        name,
        department_id: payload.department_id,
        role_id: payload.role_id,
        approved: approval_after_edit(Editor::Owner, None),
    };

    let updated = db::profiles::update(&state.pool, user_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let action = audit_action(
        auth.status.state(),
        ProfileStatus::of(Some(&updated)).state(),
    );
    tracing::info!(%user_id, approved = updated.approved, action, "profile updated by owner");
    log_activity(&state.event_bus, action, Some(user_id), &updated, Some(before));

    Ok(Json(updated))
}
