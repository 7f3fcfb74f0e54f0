use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::authz::level_label;
use crate::events::{Loggable, Severity};
use crate::models::department::DepartmentSummary;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    /// Stored privilege level (0-5, 10)
    #[schema(example = 2)]
    pub level: i64,
    #[schema(example = "PROFESSIONAL")]
    pub level_label: String,
    pub department_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loggable for Role {
    fn entity_type() -> &'static str { "role" }
    fn subject_id(&self) -> String { self.id.to_string() }
    fn severity(&self) -> Severity { Severity::Critical }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRole {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub department_id: i64,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbRole> for Role {
    fn from(db: DbRole) -> Self {
        let department = db.department_name.map(|name| DepartmentSummary {
            id: db.department_id,
            name,
        });

        Role {
            id: db.id,
            name: db.name,
            level: db.level,
            level_label: level_label(db.level).to_string(),
            department_id: db.department_id,
            department,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Role as embedded in a profile: enough for the gate and the client to
/// derive the caller's level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub level_label: String,
    pub department_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreateRequest {
    #[schema(example = "Senior Engineer")]
    pub name: Option<String>,
    #[schema(example = 3)]
    pub level: Option<i64>,
    #[schema(example = 1)]
    pub department_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    pub name: Option<String>,
    pub level: Option<i64>,
    pub department_id: Option<i64>,
}

impl RoleUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.level.is_none() && self.department_id.is_none()
    }
}
