use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::profiles::{self, ProfileChanges};
use crate::authz::RoleLevel;
use crate::errors::AppError;
use crate::models::profile::Profile;

pub const DEPARTMENTS: [&str; 4] = ["Engineering", "Human Resources", "Operations", "Administration"];

/// (role, level, department)
pub const ROLES: [(&str, RoleLevel, &str); 8] = [
    ("Open User", RoleLevel::Open, "Administration"),
    ("Assistant Developer", RoleLevel::Assistant, "Engineering"),
    ("Professional Developer", RoleLevel::Professional, "Engineering"),
    ("Senior Engineer", RoleLevel::Senior, "Engineering"),
    ("Engineering Manager", RoleLevel::Manager, "Engineering"),
    ("HR Executive", RoleLevel::Executive, "Human Resources"),
    ("Operations Manager", RoleLevel::Manager, "Operations"),
    ("Super Admin", RoleLevel::SuperAdmin, "Administration"),
];

pub const ADMIN_ROLE: &str = "Super Admin";
pub const ADMIN_DEPARTMENT: &str = "Administration";

/// Idempotent: existing rows with the same names are left untouched.
pub async fn run(pool: &SqlitePool) -> Result<(), AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for name in DEPARTMENTS {
        sqlx::query("INSERT OR IGNORE INTO departments (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    for (name, level, department) in ROLES {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO roles (name, level, department_id, created_at, updated_at)
            SELECT ?, ?, id, ?, ? FROM departments WHERE name = ?
            "#,
        )
        .bind(name)
        .bind(level.value())
        .bind(now)
        .bind(now)
        .bind(department)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(departments = DEPARTMENTS.len(), roles = ROLES.len(), "reference data seeded");
    Ok(())
}

/// Gives `user_id` an approved Super Admin profile so the first approver
/// exists. Seeds reference data if needed.
pub async fn bootstrap_admin(pool: &SqlitePool, user_id: Uuid, name: &str) -> Result<Profile, AppError> {
    run(pool).await?;

    let (role_id, department_id): (i64, i64) = sqlx::query_as(
        r#"
        SELECT r.id, d.id
        FROM roles r, departments d
        WHERE r.name = ? AND d.name = ?
        "#,
    )
    .bind(ADMIN_ROLE)
    .bind(ADMIN_DEPARTMENT)
    .fetch_one(pool)
    .await?;

    let changes = ProfileChanges {
        name: Some(name.to_string()),
        department_id: Some(department_id),
        role_id: Some(role_id),
        approved: Some(true),
    };

    match profiles::update(pool, user_id, &changes).await? {
        Some(profile) => Ok(profile),
        None => profiles::insert(pool, user_id, name, department_id, role_id, true).await,
    }
}
