use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::level_label;
use crate::errors::AppError;
use crate::events::{Loggable, Severity};
use crate::models::department::DepartmentSummary;
use crate::models::role::RoleSummary;

/// A user's profile as served by the API and consumed by the client
/// reconciler. Both sides derive profile status from this one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub approved: bool,
    pub role: Option<RoleSummary>,
    pub department: Option<DepartmentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Stored level of the assigned role, if any.
    pub fn role_level(&self) -> Option<i64> {
        self.role.as_ref().map(|role| role.level)
    }
}

impl Loggable for Profile {
    fn entity_type() -> &'static str { "profile" }
    fn subject_id(&self) -> String { self.user_id.to_string() }
    fn severity(&self) -> Severity { Severity::Important }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProfile {
    pub id: String,
    pub user_id: String,
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role_name: Option<String>,
    pub role_level: Option<i64>,
    pub role_department_id: Option<i64>,
    pub department_name: Option<String>,
}

impl TryFrom<DbProfile> for Profile {
    type Error = AppError;

    fn try_from(value: DbProfile) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid profile id: {err}")))?;
        let user_id = Uuid::parse_str(&value.user_id)
            .map_err(|err| AppError::internal(format!("invalid profile user_id: {err}")))?;

        let role = match (value.role_id, value.role_name, value.role_level, value.role_department_id) {
            (Some(id), Some(name), Some(level), Some(department_id)) => Some(RoleSummary {
                id,
                name,
                level,
                level_label: level_label(level).to_string(),
                department_id,
            }),
            _ => None,
        };

        let department = match (value.department_id, value.department_name) {
            (Some(id), Some(name)) => Some(DepartmentSummary { id, name }),
            _ => None,
        };

        Ok(Profile {
            id,
            user_id,
            name: value.name,
            department_id: value.department_id,
            role_id: value.role_id,
            approved: value.approved,
            role,
            department,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreateRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = 1)]
    pub department_id: Option<i64>,
    #[schema(example = 2)]
    pub role_id: Option<i64>,
}

/// Self-service edit. There is no `approved` field: owners cannot approve
/// themselves and any accepted edit clears approval.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
}

impl ProfileUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.department_id.is_none() && self.role_id.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfileUpdateRequest {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub approved: Option<bool>,
}

impl AdminProfileUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.department_id.is_none() && self.role_id.is_none() && self.approved.is_none()
    }
}
