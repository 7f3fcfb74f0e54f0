use chrono::Utc;
use sqlx::SqlitePool;

use super::write_error;
use crate::errors::{AppError, ReasonCode};
use crate::models::department::Department;

const SELECT_DEPARTMENT: &str = "SELECT id, name, created_at, updated_at FROM departments";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Department>, AppError> {
    let rows = sqlx::query_as::<_, Department>(&format!("{SELECT_DEPARTMENT} ORDER BY name ASC"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Department>, AppError> {
    let row = sqlx::query_as::<_, Department>(&format!("{SELECT_DEPARTMENT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, name: &str) -> Result<Department, AppError> {
    let now = Utc::now();
    let id = sqlx::query("INSERT INTO departments (name, created_at, updated_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Department"))?
        .last_insert_rowid();

    get(pool, id)
        .await?
        .ok_or_else(|| AppError::internal("department vanished after insert"))
}

pub async fn update(pool: &SqlitePool, id: i64, name: &str) -> Result<Option<Department>, AppError> {
    let result = sqlx::query("UPDATE departments SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Department"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

/// Deletes a department nobody points at. Returns `false` when it did not
/// exist.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let (roles, profiles): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM roles WHERE department_id = ?),
            (SELECT COUNT(*) FROM profiles WHERE department_id = ?)
        "#,
    )
    .bind(id)
    .bind(id)
    .fetch_one(pool)
    .await?;

    if roles > 0 || profiles > 0 {
        return Err(AppError::conflict(
            ReasonCode::ReferentialConflict,
            "Cannot delete department with associated roles or users.",
        ));
    }

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|err| write_error(err, ReasonCode::DuplicateName, "Department"))?;

    Ok(result.rows_affected() > 0)
}
