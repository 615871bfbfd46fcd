mod common;

use anyhow::Result;
use common::{Session, ADMIN_EMAIL, ADMIN_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn leaders_apply_to_open_projects_once() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let (leader, _) = Session::new_leader(server).await?;
    let (coordinator, _) = Session::new_coordinator(server).await?;

    let (status, body) = leader.post("/api/projects/apply", json!({"projectId": 1})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "You need to create a team first");

    let (status, body) = coordinator
        .post("/api/projects", json!({"title": "Smart Campus", "description": "Sensors everywhere"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = body["data"]["id"].as_i64().unwrap_or_default();

    leader
        .post("/api/teams", json!({"teamName": "Alpha", "projectName": "Smart Campus"}))
        .await?;

    let (status, _) = leader.post("/api/projects/apply", json!({"projectId": project_id})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = leader.post("/api/projects/apply", json!({"projectId": project_id})).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = coordinator.get("/api/projects").await?;
    assert_eq!(status, StatusCode::OK);
    let mine = body["data"]
        .as_array()
        .and_then(|projects| projects.iter().find(|p| p["id"] == project_id))
        .cloned()
        .unwrap_or_default();
    assert_eq!(mine["teamCount"], 1);
    assert_eq!(mine["teams"][0]["teamName"], "Alpha");
    Ok(())
}

#[tokio::test]
async fn admin_manages_users_and_sees_stats() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let admin = Session::login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    let (leader, user) = Session::new_leader(server).await?;

    let (status, body) = admin.get("/api/admin/stats").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["totalUsers"].as_i64().unwrap_or_default() >= 3);

    let (status, body) = admin.get("/api/admin/users").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"][0].get("passwordHash").is_none());

    let (status, _) = leader.get("/api/admin/users").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = admin
        .patch("/api/admin/users", json!({"userId": user["id"], "newPassword": "reset-by-admin"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "TEAM_LEADER");

    let email = user["email"].as_str().unwrap_or_default().to_string();
    Session::login(server, &email, "reset-by-admin").await?;

    let (status, _) = admin
        .patch("/api/admin/users", json!({"userId": i64::MAX, "role": "COORDINATOR"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
