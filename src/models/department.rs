use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::events::{Loggable, Severity};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loggable for Department {
    fn entity_type() -> &'static str { "department" }
    fn subject_id(&self) -> String { self.id.to_string() }
    fn severity(&self) -> Severity { Severity::Critical }
}

/// Department as embedded in role and profile responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentSummary {
    pub id: i64,
    pub name: String,
}

impl From<&Department> for DepartmentSummary {
    fn from(value: &Department) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentCreateRequest {
    #[schema(example = "Engineering")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentUpdateRequest {
    #[schema(example = "Platform Engineering")]
    pub name: Option<String>,
}
