use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{Assistant, Authorized, RoleLevel};
use crate::errors::AppResult;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub role_level: RoleLevel,
    pub department_id: Option<i64>,
    /// True when served in advisory mode to a profile awaiting approval
    pub approval_pending: bool,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard summary for members at ASSISTANT or above", body = DashboardResponse),
        (status = 403, description = "Profile missing, incomplete, pending approval (strict) or role too low", body = crate::errors::ErrorResponse)
    )
)]
pub async fn dashboard(auth: Authorized<Assistant>) -> AppResult<Json<DashboardResponse>> {
    Ok(Json(DashboardResponse {
        user_id: auth.user_id(),
        name: auth.profile.as_ref().and_then(|profile| profile.name.clone()),
        role_level: auth.role_level,
        department_id: auth.department_id,
        approval_pending: auth.degraded,
    }))
}
