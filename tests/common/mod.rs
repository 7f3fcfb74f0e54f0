#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use rolegate::authz::ApprovalEnforcement;
use rolegate::db::seed;
use rolegate::session::SessionConfig;
use rolegate::{create_app_with_config, AppConfig};

pub const SECRET: &str = "test-secret";

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn reason(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub session: SessionConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Fresh temp database, migrated and seeded, with a fixed approval mode.
    pub async fn new(mode: ApprovalEnforcement) -> Result<Self> {
        Self::with_config(AppConfig::new(SessionConfig::new(SECRET)).with_approval(mode)).await
    }

    /// Same setup with the caller's config, e.g. one that keeps reading the
    /// approval mode from the environment.
    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create tempdir")?;
        let opts = SqliteConnectOptions::new()
            .filename(dir.path().join("test.db"))
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;

        let migrator =
            sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
        migrator.run(&pool).await?;
        seed::run(&pool).await?;

        let session = config.session.clone();
        let router = create_app_with_config(pool.clone(), config).await?;

        Ok(Self {
            router,
            pool,
            session,
            _dir: dir,
        })
    }

    pub fn token(&self, user_id: Uuid) -> String {
        self.session.issue(user_id, None).expect("token issue")
    }

    pub async fn send(&self, req: Request<Body>) -> Result<Reply> {
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(Reply { status, headers, body })
    }

    pub async fn call(&self, method: Method, uri: &str, user: Option<Uuid>, body: Option<Value>) -> Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", self.token(user)));
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, user: Option<Uuid>) -> Result<Reply> {
        self.call(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<Uuid>, body: Value) -> Result<Reply> {
        self.call(Method::POST, uri, user, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: Option<Uuid>, body: Value) -> Result<Reply> {
        self.call(Method::PATCH, uri, user, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Option<Uuid>) -> Result<Reply> {
        self.call(Method::DELETE, uri, user, None).await
    }

    /// A new user holding an approved Super Admin profile.
    pub async fn admin(&self) -> Result<Uuid> {
        let user = Uuid::new_v4();
        seed::bootstrap_admin(&self.pool, user, "Root Admin").await?;
        Ok(user)
    }

    pub async fn role_id(&self, name: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("role {name} not seeded"))
    }

    pub async fn department_id(&self, name: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT id FROM departments WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("department {name} not seeded"))
    }

    /// Creates a complete profile through the API; it starts unapproved.
    pub async fn member(&self, role: &str, department: &str) -> Result<Uuid> {
        let user = Uuid::new_v4();
        let body = serde_json::json!({
            "name": "Test Member",
            "departmentId": self.department_id(department).await?,
            "roleId": self.role_id(role).await?,
        });
        let reply = self.post("/api/profile", Some(user), body).await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "profile create failed: {} {}", reply.status, reply.body);
        Ok(user)
    }

    /// Approves `user` as `admin` through the admin endpoint.
    pub async fn approve(&self, admin: Uuid, user: Uuid) -> Result<()> {
        let reply = self
            .patch(&format!("/api/admin/profiles/{user}"), Some(admin), serde_json::json!({ "approved": true }))
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "approve failed: {} {}", reply.status, reply.body);
        Ok(())
    }
}
