use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

/// Machine-readable reason attached to every error body so callers can branch
/// without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Unauthenticated,
    ProfileNotFound,
    ProfileIncomplete,
    ProfilePendingApproval,
    InsufficientRole,
    ValidationError,
    NotFound,
    ProfileAlreadyExists,
    ReferentialConflict,
    DuplicateName,
    InternalError,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Unauthenticated => "UNAUTHENTICATED",
            ReasonCode::ProfileNotFound => "PROFILE_NOT_FOUND",
            ReasonCode::ProfileIncomplete => "PROFILE_INCOMPLETE",
            ReasonCode::ProfilePendingApproval => "PROFILE_PENDING_APPROVAL",
            ReasonCode::InsufficientRole => "INSUFFICIENT_ROLE",
            ReasonCode::ValidationError => "VALIDATION_ERROR",
            ReasonCode::NotFound => "NOT_FOUND",
            ReasonCode::ProfileAlreadyExists => "PROFILE_ALREADY_EXISTS",
            ReasonCode::ReferentialConflict => "REFERENTIAL_CONFLICT",
            ReasonCode::DuplicateName => "DUPLICATE_NAME",
            ReasonCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReasonCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ReasonCode::ProfileNotFound
            | ReasonCode::ProfileIncomplete
            | ReasonCode::ProfilePendingApproval
            | ReasonCode::InsufficientRole => StatusCode::FORBIDDEN,
            ReasonCode::ValidationError => StatusCode::BAD_REQUEST,
            ReasonCode::NotFound => StatusCode::NOT_FOUND,
            ReasonCode::ProfileAlreadyExists
            | ReasonCode::ReferentialConflict
            | ReasonCode::DuplicateName => StatusCode::CONFLICT,
            ReasonCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {message}")]
    Forbidden { reason: ReasonCode, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {message}")]
    Conflict { reason: ReasonCode, message: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self::Forbidden {
            reason,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self::Conflict {
            reason,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn token(err: impl Into<String>) -> Self {
        Self::Token(err.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            AppError::Unauthenticated(_) | AppError::Token(_) => ReasonCode::Unauthenticated,
            AppError::Forbidden { reason, .. } | AppError::Conflict { reason, .. } => *reason,
            AppError::NotFound(_) => ReasonCode::NotFound,
            AppError::BadRequest(_) => ReasonCode::ValidationError,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                ReasonCode::InternalError
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.reason().status()
    }

    /// Message safe to hand to the caller. Store and internal failures never
    /// expose their detail.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthenticated(message)
            | AppError::NotFound(message)
            | AppError::BadRequest(message) => message.clone(),
            AppError::Forbidden { message, .. } | AppError::Conflict { message, .. } => {
                message.clone()
            }
            AppError::Token(_) => "invalid or expired session".to_string(),
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                "internal server error".to_string()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ReasonCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let reason = self.reason();

        match &self {
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
            }
            AppError::Token(detail) => {
                tracing::debug!(detail = %detail, "session token rejected");
            }
            _ => {}
        }

        let payload = ErrorResponse {
            error: reason,
            message: self.public_message(),
        };

        (reason.status(), Json(payload)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_reasons_map_to_forbidden() {
        for reason in [
            ReasonCode::ProfileNotFound,
            ReasonCode::ProfileIncomplete,
            ReasonCode::ProfilePendingApproval,
            ReasonCode::InsufficientRole,
        ] {
            assert_eq!(reason.status(), StatusCode::FORBIDDEN, "{reason}");
        }
        assert_eq!(ReasonCode::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn reason_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ReasonCode::ProfilePendingApproval).unwrap();
        assert_eq!(json, "\"PROFILE_PENDING_APPROVAL\"");
        assert_eq!(ReasonCode::ReferentialConflict.as_str(), "REFERENTIAL_CONFLICT");
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = AppError::internal("connection string postgres://secret");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal server error");
        assert_eq!(err.reason(), ReasonCode::InternalError);
    }

    #[test]
    fn token_errors_are_unauthenticated() {
        let err = AppError::token("ExpiredSignature");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.reason(), ReasonCode::Unauthenticated);
    }
}
