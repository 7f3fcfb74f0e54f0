mod common;

use std::net::SocketAddr;

use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use rolegate::authz::{ApprovalEnforcement, ApprovalModeSource, RoleLevel};
use rolegate::client::{
    ClientSession, HttpProfileSource, InvalidationTag, ReconcilerConfig, StatusReconciler, UiAction,
    DEFAULT_PENDING_APPROVAL_PATH,
};
use rolegate::session::{Identity, SessionConfig};

/// Serves the app on an ephemeral local port for the lifetime of the test.
async fn serve(app: &TestApp) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router.into_make_service()).await });
    Ok(addr)
}

fn reconciler(addr: SocketAddr, mode: ApprovalEnforcement) -> StatusReconciler<HttpProfileSource> {
    let config = ReconcilerConfig {
        enforcement: ApprovalModeSource::Fixed(mode),
        ..ReconcilerConfig::default()
    };
    StatusReconciler::new(HttpProfileSource::new(format!("http://{addr}/")), config)
}

fn signed_in(user_id: Uuid, token: String) -> InvalidationTag {
    InvalidationTag::SignedIn(ClientSession { identity: Identity::new(user_id), token })
}

#[tokio::test]
async fn follows_profile_lifecycle_over_http() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let addr = serve(&app).await?;
    let client = reconciler(addr, ApprovalEnforcement::Strict);
    let user = Uuid::new_v4();

    client.invalidate(signed_in(user, app.token(user))).await;
    assert_eq!(client.snapshot().await?, None);
    assert_eq!(client.action_for("/dashboard").await, UiAction::CompletionPrompt);
    assert_eq!(client.action_for("/profile").await, UiAction::None);

    let body = json!({
        "name": "Lin",
        "departmentId": app.department_id("Engineering").await?,
        "roleId": app.role_id("Senior Engineer").await?,
    });
    let reply = app.post("/api/profile", Some(user), body).await?;
    assert_eq!(reply.status, axum::http::StatusCode::CREATED, "{}", reply.body);

    // cached until told otherwise
    assert_eq!(client.action_for("/dashboard").await, UiAction::CompletionPrompt);
    client.invalidate(InvalidationTag::ProfileMutated).await;
    assert_eq!(
        client.action_for("/dashboard").await,
        UiAction::PendingApprovalRedirect(DEFAULT_PENDING_APPROVAL_PATH.to_string())
    );

    let admin = app.admin().await?;
    app.approve(admin, user).await?;
    client.invalidate(InvalidationTag::ProfileMutated).await;

    let profile = client.snapshot().await?.expect("profile after approval");
    assert!(profile.approved);
    assert_eq!(client.action_for("/dashboard").await, UiAction::None);
    assert!(client.has_access(RoleLevel::Senior).await);
    assert!(!client.has_access(RoleLevel::Manager).await);
    Ok(())
}

#[tokio::test]
async fn advisory_mode_shows_banner_over_http() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Advisory).await?;
    let addr = serve(&app).await?;
    let client = reconciler(addr, ApprovalEnforcement::Advisory);
    let user = app.member("Assistant Developer", "Engineering").await?;

    client.invalidate(signed_in(user, app.token(user))).await;
    assert_eq!(client.action_for("/dashboard").await, UiAction::ApprovalBanner);
    Ok(())
}

#[tokio::test]
async fn rejected_session_reads_as_no_profile() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let addr = serve(&app).await?;
    let client = reconciler(addr, ApprovalEnforcement::Strict);
    let user = app.member("Assistant Developer", "Engineering").await?;

    let forged = SessionConfig::new("someone-else").issue(user, None)?;
    client.invalidate(signed_in(user, forged)).await;
    assert_eq!(client.snapshot().await?, None);
    assert!(!client.has_access(RoleLevel::Open).await);
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_and_show_nothing() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let addr = serve(&app).await?;
    let client = reconciler(addr, ApprovalEnforcement::Strict);
    let user = Uuid::new_v4();
    client.invalidate(signed_in(user, app.token(user))).await;

    app.pool.close().await;
    assert!(client.snapshot().await.is_err());
    assert_eq!(client.action_for("/dashboard").await, UiAction::None);
    Ok(())
}
