mod common;

use anyhow::Result;
use common::{unique_email, Session};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_login_and_profile() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let email = unique_email("sara");
    let anonymous = Session::anonymous(server)?;

    let (status, body) = anonymous
        .post("/api/auth/register", json!({"name": "Sara", "email": email, "password": "secret1"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "TEAM_LEADER");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = anonymous
        .post("/api/auth/register", json!({"name": "Sara", "email": email, "password": "secret1"}))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = anonymous
        .post("/api/auth/login", json!({"email": email, "password": "wrong-one"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let session = Session::login(server, &email, "secret1").await?;
    let (status, body) = session.get("/api/auth/me").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email.as_str());
    Ok(())
}

#[tokio::test]
async fn change_password_then_logout() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let (session, user) = Session::new_leader(server).await?;
    let email = user["email"].as_str().unwrap_or_default().to_string();

    let (status, body) = session
        .post("/api/auth/change-password", json!({"currentPassword": "nope-nope", "newPassword": "fresh-secret"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = session
        .post("/api/auth/change-password", json!({"currentPassword": "leader123", "newPassword": "fresh-secret"}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = session.post("/api/auth/logout", json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = session.get("/api/auth/me").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(Session::login(server, &email, "leader123").await.is_err());
    Session::login(server, &email, "fresh-secret").await?;
    Ok(())
}
