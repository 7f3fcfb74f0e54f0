//! Session verification for tokens minted by the external identity provider.
//!
//! The provider signs HS256 tokens with a secret shared with this service. A
//! token is read from the `Authorization: Bearer` header first and from the
//! configured session cookies second.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

pub const DEFAULT_COOKIE_NAMES: [&str; 2] = ["access_token", "refresh_token"];

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
    /// Cookies that carry session material. The first one holds the access
    /// token; all of them are cleared when a session turns out to be stale.
    pub cookie_names: Arc<Vec<String>>,
}

impl SessionConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            exp_hours: 24,
            cookie_names: Arc::new(DEFAULT_COOKIE_NAMES.iter().map(|name| name.to_string()).collect()),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("SESSION_JWT_SECRET")
            .map_err(|_| AppError::configuration("SESSION_JWT_SECRET not set"))?;
        let exp_hours = std::env::var("SESSION_EXP_HOURS")
            .map(|val| val.parse::<i64>())
            .unwrap_or(Ok(24))
            .map_err(|_| AppError::configuration("SESSION_EXP_HOURS must be a valid integer"))?;

        let mut config = Self::new(secret.into_bytes());
        config.exp_hours = exp_hours;

        if let Ok(raw) = std::env::var("SESSION_COOKIE_NAMES") {
            let names: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
            if names.is_empty() {
                return Err(AppError::configuration("SESSION_COOKIE_NAMES must name at least one cookie"));
            }
            config.cookie_names = Arc::new(names);
        }

        Ok(config)
    }

    /// Mints a token the way the identity provider does. Used by the dev CLI and tests.
    pub fn issue(&self, user_id: Uuid, email: Option<&str>) -> Result<String, AppError> {
        use chrono::{Duration, Utc};

        let now = Utc::now();
        let exp = now + Duration::hours(self.exp_hours);

        let claims = Claims {
            sub: user_id,
            email: email.map(String::from),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|err| AppError::token(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|err| AppError::token(err.to_string()))
    }

    pub fn access_cookie(&self) -> Option<&str> {
        self.cookie_names.first().map(String::as_str)
    }

    /// Raw session token, if the request carries one.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        let jar = CookieJar::from_headers(headers);
        self.access_cookie()
            .and_then(|name| jar.get(name))
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Resolves the session subject. Missing and invalid sessions both yield
    /// `None`; the gate turns that into `UNAUTHENTICATED`.
    pub fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = self.token_from_headers(headers)?;

        match self.verify(&token) {
            Ok(claims) => Some(Identity {
                user_id: claims.sub,
                email: claims.email,
            }),
            Err(err) => {
                tracing::debug!(error = %err, "discarding invalid session token");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated principal, independent of any profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id, email: None }
    }
}
