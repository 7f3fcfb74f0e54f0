use async_trait::async_trait;
use reqwest::StatusCode;

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::session::Identity;

/// A signed-in caller as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub identity: Identity,
    pub token: String,
}

/// Where the reconciler gets the caller's own profile from.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// `Ok(None)` covers both "no profile yet" and a session the server no
    /// longer accepts.
    async fn fetch_own_profile(&self, session: &ClientSession) -> Result<Option<Profile>, AppError>;
}

/// Calls `GET /api/profile` on a running server.
#[derive(Debug, Clone)]
pub struct HttpProfileSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch_own_profile(&self, session: &ClientSession) -> Result<Option<Profile>, AppError> {
        let response = self
            .client
            .get(format!("{}/api/profile", self.base_url))
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("profile fetch failed: {err}")))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!(status = %response.status(), "profile fetch rejected; treating as no profile");
                Ok(None)
            }
            status if status.is_success() => response
                .json::<Option<Profile>>()
                .await
                .map_err(|err| AppError::internal(format!("profile response unreadable: {err}"))),
            status => Err(AppError::internal(format!("profile fetch returned {status}"))),
        }
    }
}
