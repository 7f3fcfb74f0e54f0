//! Edge interception: the first, session-only enforcement point.
//!
//! Runs for every request outside the public allow-list. It never looks at
//! profiles; completeness, approval and role are the endpoint guard's job.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::gate::{Decision, Gate};
use super::level::RoleLevel;
use super::policy::Policy;
use crate::app::AppState;
use crate::errors::AppError;

pub const DEFAULT_PUBLIC_PREFIXES: [&str; 13] = [
    "/login",
    "/signup",
    "/auth/callback",
    "/forbidden",
    "/api/auth/",
    "/api/health",
    "/api/departments",
    "/api/roles",
    "/assets/",
    "/static/",
    "/docs",
    "/api-docs/",
    "/favicon.ico",
];

#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub login_path: String,
    pub public_prefixes: Vec<String>,
    /// Requests under this prefix get a 401 body instead of a redirect
    pub api_prefix: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            public_prefixes: DEFAULT_PUBLIC_PREFIXES.iter().map(|p| p.to_string()).collect(),
            api_prefix: "/api/".to_string(),
        }
    }
}

impl EdgeConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("LOGIN_PATH") {
            let path = path.trim();
            if !path.is_empty() {
                config.login_path = path.to_string();
            }
        }
        config
    }

    /// Prefixes match on segment boundaries: `/login` covers `/login` and
    /// `/login/...` but not `/loginx`. A prefix ending in `/` covers its subtree.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|prefix| covers(prefix, path))
    }

    pub fn is_api(&self, path: &str) -> bool {
        path.starts_with(self.api_prefix.as_str())
    }

    /// `<login>?next=<original>` with the original path and query encoded.
    pub fn login_redirect(&self, original: &str) -> String {
        format!("{}?next={}", self.login_path, urlencoding::encode(original))
    }
}

fn covers(prefix: &str, path: &str) -> bool {
    if let Some(dir) = prefix.strip_suffix('/') {
        return path == dir || path.starts_with(prefix);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

pub async fn edge_interceptor(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let policy = if state.edge.is_public(&path) {
        Policy::PublicRead
    } else {
        Policy::Member(RoleLevel::Open)
    };

    let identity = state.session.identify(request.headers());
    let redirect = if state.edge.is_api(&path) {
        None
    } else {
        let original = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());
        Some(state.edge.login_redirect(&original))
    };

    let gate = Gate::new(state.approval.current());
    match gate.screen(identity, policy, redirect) {
        Decision::Proceed(_) | Decision::Allow(_) => {
            if policy == Policy::PublicRead {
                tracing::debug!(%path, "public route, bypassing session check");
            }
            next.run(request).await
        }
        Decision::RedirectRequired(target) => {
            tracing::debug!(%path, %target, "no valid session, redirecting to login");
            (clear_session_cookies(jar, &state), Redirect::to(&target)).into_response()
        }
        Decision::Deny(denial) => {
            tracing::warn!(%path, reason = %denial.reason, "no valid session on api request");
            (clear_session_cookies(jar, &state), AppError::from(denial)).into_response()
        }
    }
}

fn clear_session_cookies(mut jar: CookieJar, state: &AppState) -> CookieJar {
    for name in state.session.cookie_names.iter() {
        if jar.get(name).is_none() {
            continue;
        }
        jar = jar.remove(Cookie::build((name.clone(), "")).path("/"));
    }
    jar
}
