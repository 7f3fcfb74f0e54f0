mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use rolegate::authz::ApprovalEnforcement;

#[tokio::test]
async fn missing_session_is_unauthenticated() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    for uri in ["/api/profile", "/api/dashboard", "/api/admin/profiles"] {
        let reply = app.get(uri, None).await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(reply.reason(), Some("UNAUTHENTICATED"), "{uri}");
        assert!(reply.body["message"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn foreign_tokens_are_rejected() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let forged = rolegate::session::SessionConfig::new("someone-else").issue(Uuid::new_v4(), None)?;

    let req = axum::http::Request::builder()
        .uri("/api/profile")
        .header("authorization", format!("Bearer {forged}"))
        .body(axum::body::Body::empty())?;
    let reply = app.send(req).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn no_profile_on_member_route() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let reply = app.get("/api/dashboard", Some(Uuid::new_v4())).await?;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("PROFILE_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn admin_mutation_body_never_runs_when_denied() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    let reply = app.post("/api/departments", Some(Uuid::new_v4()), json!({ "name": "Shadow IT" })).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("PROFILE_NOT_FOUND"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE name = 'Shadow IT'")
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn incomplete_profile_on_member_route() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let user = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO profiles (id, user_id, name, department_id, role_id, approved, created_at, updated_at) VALUES (?, ?, ?, NULL, NULL, 1, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user.to_string())
    .bind("Partial")
    .bind(now)
    .bind(now)
    .execute(&app.pool)
    .await?;

    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("PROFILE_INCOMPLETE"));

    // self-service routes tolerate the incomplete record
    let reply = app.get("/api/profile", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Partial");

    let reply = app.post("/api/profile", Some(user), json!({ "name": "x", "departmentId": 1, "roleId": 1 })).await?;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn strict_mode_blocks_pending_members() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let user = app.member("Assistant Developer", "Engineering").await?;

    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("PROFILE_PENDING_APPROVAL"));
    assert!(reply.header("x-profile-approval").is_none());

    // own profile stays reachable
    let reply = app.get("/api/profile", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn advisory_mode_allows_pending_members_degraded() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Advisory).await?;
    let user = app.member("Assistant Developer", "Engineering").await?;

    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["approvalPending"], true);
    assert_eq!(reply.body["roleLevel"], "ASSISTANT");
    assert_eq!(reply.header("x-profile-approval"), Some("pending"));

    let admin = app.admin().await?;
    app.approve(admin, user).await?;

    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["approvalPending"], false);
    assert!(reply.header("x-profile-approval").is_none());
    Ok(())
}

#[tokio::test]
async fn role_level_is_checked_after_approval() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let admin = app.admin().await?;

    let open_user = app.member("Open User", "Administration").await?;
    app.approve(admin, open_user).await?;
    let reply = app.get("/api/dashboard", Some(open_user)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("INSUFFICIENT_ROLE"));

    let manager = app.member("Engineering Manager", "Engineering").await?;
    app.approve(admin, manager).await?;
    let reply = app.get("/api/dashboard", Some(manager)).await?;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.get("/api/admin/profiles", Some(manager)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("INSUFFICIENT_ROLE"));

    let reply = app.get("/api/dashboard", Some(admin)).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["roleLevel"], "SUPER_ADMIN");
    Ok(())
}

#[tokio::test]
async fn unrecognized_stored_level_counts_as_open() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let admin = app.admin().await?;

    let department_id = app.department_id("Operations").await?;
    let now = Utc::now();
    sqlx::query("INSERT INTO roles (name, level, department_id, created_at, updated_at) VALUES ('Odd Level', 7, ?, ?, ?)")
        .bind(department_id)
        .bind(now)
        .bind(now)
        .execute(&app.pool)
        .await?;

    let user = app.member("Odd Level", "Operations").await?;
    app.approve(admin, user).await?;

    let reply = app.get("/api/dashboard", Some(user)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.reason(), Some("INSUFFICIENT_ROLE"));
    Ok(())
}
