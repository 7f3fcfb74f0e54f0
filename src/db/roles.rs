use chrono::Utc;
use sqlx::SqlitePool;

use super::write_error;
use crate::errors::{AppError, ReasonCode};
use crate::models::role::{DbRole, Role, RoleUpdateRequest};

const SELECT_ROLE: &str = r#"
    SELECT r.id, r.name, r.level, r.department_id, d.name AS department_name, r.created_at, r.updated_at
    FROM roles r
    LEFT JOIN departments d ON d.id = r.department_id
"#;

pub async fn list(pool: &SqlitePool) -> Result<Vec<Role>, AppError> {
    let rows = sqlx::query_as::<_, DbRole>(&format!("{SELECT_ROLE} ORDER BY r.name ASC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Role::from).collect())
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Role>, AppError> {
    let row = sqlx::query_as::<_, DbRole>(&format!("{SELECT_ROLE} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Role::from))
}

pub async fn create(pool: &SqlitePool, name: &str, level: i64, department_id: i64) -> Result<Role, AppError> {
    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO roles (name, level, department_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(level)
    .bind(department_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Role"))?
    .last_insert_rowid();

    get(pool, id)
        .await?
        .ok_or_else(|| AppError::internal("role vanished after insert"))
}

/// Applies the present fields of `changes`; absent fields keep their value.
pub async fn update(pool: &SqlitePool, id: i64, changes: &RoleUpdateRequest) -> Result<Option<Role>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE roles
        SET name = COALESCE(?, name),
            level = COALESCE(?, level),
            department_id = COALESCE(?, department_id),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(changes.name.as_deref())
    .bind(changes.level)
    .bind(changes.department_id)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Role"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let holders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    if holders > 0 {
        return Err(AppError::conflict(
            ReasonCode::ReferentialConflict,
            "Cannot delete role assigned to users.",
        ));
    }

    let result = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Role"))?;

    Ok(result.rows_affected() > 0)
}
