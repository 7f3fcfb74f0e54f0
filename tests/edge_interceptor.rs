mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use uuid::Uuid;

use common::TestApp;
use rolegate::authz::ApprovalEnforcement;

fn page(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    Ok(builder.body(Body::empty())?)
}

#[tokio::test]
async fn protected_page_redirects_to_login() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    let reply = app.send(page("/admin", None)?).await?;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.header("location"), Some("/login?next=%2Fadmin"));

    let reply = app.send(page("/profile?pendingApproval=true", None)?).await?;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(
        reply.header("location"),
        Some("/login?next=%2Fprofile%3FpendingApproval%3Dtrue")
    );
    Ok(())
}

#[tokio::test]
async fn stale_cookie_is_cleared_on_redirect() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    let reply = app.send(page("/dashboard", Some("access_token=garbage"))?).await?;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);

    let cleared: Vec<&str> = reply
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert!(
        cleared.iter().any(|c| c.starts_with("access_token=") && c.contains("Max-Age=0")),
        "expected access_token removal, got {cleared:?}"
    );
    Ok(())
}

#[tokio::test]
async fn only_carried_cookies_are_cleared() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    let reply = app.send(page("/dashboard", Some("access_token=garbage"))?).await?;
    let cleared: Vec<&str> = reply
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert_eq!(cleared.len(), 1, "{cleared:?}");
    assert!(!cleared.iter().any(|c| c.starts_with("refresh_token=")));

    let reply = app.send(page("/dashboard", None)?).await?;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert!(reply.header("set-cookie").is_none());

    let reply = app
        .send(page("/dashboard", Some("access_token=garbage; refresh_token=old"))?)
        .await?;
    let cleared = reply.headers.get_all("set-cookie").iter().count();
    assert_eq!(cleared, 2);
    Ok(())
}

#[tokio::test]
async fn lookalike_paths_are_not_public() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    for uri in ["/loginx", "/docs-internal", "/signup-admin"] {
        let reply = app.send(page(uri, None)?).await?;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{uri}");
    }

    let reply = app.get("/api/rolesfoo", None).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.reason(), Some("UNAUTHENTICATED"));

    let reply = app.get("/api/roles", None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn api_requests_get_json_instead_of_redirect() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    let reply = app.get("/api/dashboard", None).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.reason(), Some("UNAUTHENTICATED"));
    assert!(reply.header("location").is_none());
    Ok(())
}

#[tokio::test]
async fn public_routes_pass_without_session() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;

    for uri in ["/login", "/signup", "/forbidden"] {
        let reply = app.send(page(uri, None)?).await?;
        assert_eq!(reply.status, StatusCode::OK, "{uri}");
    }

    let reply = app.get("/api/departments", None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body.as_array().map(Vec::len), Some(4));

    let reply = app.get("/api/health", None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted() -> Result<()> {
    let app = TestApp::new(ApprovalEnforcement::Strict).await?;
    let token = app.token(Uuid::new_v4());

    // the edge only checks the session; profile state is not its concern
    let reply = app.send(page("/dashboard", Some(&format!("access_token={token}")))?).await?;
    assert_eq!(reply.status, StatusCode::OK);

    let req = Request::builder()
        .uri("/api/profile")
        .header("cookie", format!("access_token={token}"))
        .body(Body::empty())?;
    let reply = app.send(req).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}
