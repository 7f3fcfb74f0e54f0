use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::db;
use crate::errors::{AppError, AppResult};

pub mod admin;
pub mod dashboard;
pub mod departments;
pub mod health;
pub mod pages;
pub mod profile;
pub mod roles;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Path ids arrive as strings so a non-numeric id is a 400, not a routing miss.
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("Invalid {what} ID")))
}

/// Trimmed, non-empty name or `None`.
pub(crate) fn clean_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim).filter(|name| !name.is_empty()).map(String::from)
}

/// 400 unless every id given names an existing row.
pub(crate) async fn ensure_assignable(
    pool: &SqlitePool,
    department_id: Option<i64>,
    role_id: Option<i64>,
) -> AppResult<()> {
    if let Some(id) = department_id {
        if db::departments::get(pool, id).await?.is_none() {
            return Err(AppError::bad_request("Invalid department ID"));
        }
    }
    if let Some(id) = role_id {
        if db::roles::get(pool, id).await?.is_none() {
            return Err(AppError::bad_request("Invalid role ID"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id("42", "role").unwrap(), 42);
        assert!(matches!(parse_id("abc", "role"), Err(AppError::BadRequest(msg)) if msg == "Invalid role ID"));
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(clean_name(Some("  Ops ")), Some("Ops".to_string()));
        assert_eq!(clean_name(Some("   ")), None);
        assert_eq!(clean_name(None), None);
    }
}
