use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::write_error;
use crate::errors::{AppError, ReasonCode};
use crate::models::profile::{DbProfile, Profile};

const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.user_id, p.name, p.department_id, p.role_id, p.approved, p.created_at, p.updated_at,
           r.name AS role_name, r.level AS role_level, r.department_id AS role_department_id,
           d.name AS department_name
    FROM profiles p
    LEFT JOIN roles r ON r.id = p.role_id
    LEFT JOIN departments d ON d.id = p.department_id
"#;

/// One write against a profile. `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub approved: Option<bool>,
}

pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<Profile>, AppError> {
    let row = sqlx::query_as::<_, DbProfile>(&format!("{SELECT_PROFILE} WHERE p.user_id = ?"))
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(Profile::try_from).transpose()
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Profile>, AppError> {
    let rows = sqlx::query_as::<_, DbProfile>(&format!("{SELECT_PROFILE} ORDER BY p.created_at ASC"))
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Profile::try_from).collect()
}

/// Inserts a new profile. `approved` is fixed to false here; callers cannot
/// choose it.
pub async fn create(
    pool: &SqlitePool,
    user_id: Uuid,
    name: &str,
    department_id: i64,
    role_id: i64,
) -> Result<Profile, AppError> {
    insert(pool, user_id, name, department_id, role_id, false).await
}

pub(crate) async fn insert(
    pool: &SqlitePool,
    user_id: Uuid,
    name: &str,
    department_id: i64,
    role_id: i64,
    approved: bool,
) -> Result<Profile, AppError> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, name, department_id, role_id, approved, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(name)
    .bind(department_id)
    .bind(role_id)
    .bind(approved)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| write_error(err, ReasonCode::ProfileAlreadyExists, "Profile"))?;

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::internal("profile vanished after insert"))
}

/// Single-statement update so the approval rule travels with the write.
pub async fn update(pool: &SqlitePool, user_id: Uuid, changes: &ProfileChanges) -> Result<Option<Profile>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET name = COALESCE(?, name),
            department_id = COALESCE(?, department_id),
            role_id = COALESCE(?, role_id),
            approved = COALESCE(?, approved),
            updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(changes.name.as_deref())
    .bind(changes.department_id)
    .bind(changes.role_id)
    .bind(changes.approved)
    .bind(Utc::now())
    .bind(user_id.to_string())
    .execute(pool)
    .await
    .map_err(|err| write_error(err, ReasonCode::ProfileAlreadyExists, "Profile"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_user(pool, user_id).await
}
