//! Tests here mutate process environment variables, so they live in their
//! own binary and serialize on `ENV_LOCK`.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use tokio::sync::Mutex;

use common::{TestApp, SECRET};
use rolegate::client::{ReconcilerConfig, DEFAULT_PENDING_APPROVAL_PATH};
use rolegate::session::SessionConfig;
use rolegate::AppConfig;

const STRICT_VAR: &str = "PROFILE_APPROVAL_STRICT_MODE";

static ENV_LOCK: Mutex<()> = Mutex::const_new(());

#[tokio::test]
async fn strict_mode_flips_without_restart() -> Result<()> {
    let _env = ENV_LOCK.lock().await;
    let app = TestApp::with_config(AppConfig::new(SessionConfig::new(SECRET))).await?;
    let user = app.member("Assistant Developer", "Engineering").await?;

    std::env::set_var(STRICT_VAR, "false");
    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.header("x-profile-approval"), Some("pending"));

    // same router, no rebuild
    std::env::set_var(STRICT_VAR, "true");
    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("PROFILE_PENDING_APPROVAL"));

    std::env::remove_var(STRICT_VAR);
    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn pending_approval_path_reads_env() -> Result<()> {
    let _env = ENV_LOCK.lock().await;

    std::env::set_var("PENDING_APPROVAL_PATH", " /awaiting-approval ");
    assert_eq!(ReconcilerConfig::from_env().pending_approval_path, "/awaiting-approval");

    std::env::set_var("PENDING_APPROVAL_PATH", "   ");
    assert_eq!(ReconcilerConfig::from_env().pending_approval_path, DEFAULT_PENDING_APPROVAL_PATH);

    std::env::remove_var("PENDING_APPROVAL_PATH");
    assert_eq!(ReconcilerConfig::from_env().pending_approval_path, DEFAULT_PENDING_APPROVAL_PATH);
    Ok(())
}
