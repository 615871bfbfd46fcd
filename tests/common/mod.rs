#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

pub const ADMIN_EMAIL: &str = "admin@pfe.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Schema and default accounts first; both commands are idempotent
        for step in ["migrate", "seed"] {
            let status = Command::new(env!("CARGO_BIN_EXE_pfe"))
                .arg(step)
                .stdin(Stdio::null())
                .status()
                .with_context(|| format!("failed to run pfe {step}"))?;
            anyhow::ensure!(status.success(), "pfe {step} failed");
        }

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_pfe-api"))
            .env("PFE_API_PORT", port.to_string())
            // The shared server outlives the test binary; it must not hold the test output pipe
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// The shared server, or `None` when no database is configured (tests then skip)
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Rows referencing `team_id` in `table`, read straight from the database the server uses
pub async fn rows_for_team(table: &str, team_id: i64) -> Result<i64> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = sqlx::PgPool::connect(&url).await?;
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE team_id = $1"))
        .bind(team_id)
        .fetch_one(&pool)
        .await?;
    pool.close().await;
    Ok(count)
}

/// An email no other test run has used
pub fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}.{nanos}.{n}@pfe.test")
}

/// A cookie-carrying client acting as one user
pub struct Session {
    pub client: reqwest::Client,
    server: &'static TestServer,
}

impl Session {
    pub fn anonymous(server: &'static TestServer) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, server })
    }

    pub async fn login(server: &'static TestServer, email: &str, password: &str) -> Result<Self> {
        let session = Self::anonymous(server)?;
        let (status, body) = session
            .send(reqwest::Method::POST, "/api/auth/login", Some(serde_json::json!({"email": email, "password": password})))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login as {email} failed: {status} {body}");
        Ok(session)
    }

    /// Register a fresh team leader and sign in as them
    pub async fn new_leader(server: &'static TestServer) -> Result<(Self, Value)> {
        let email = unique_email("leader");
        let session = Self::anonymous(server)?;
        let (status, body) = session
            .send(
                reqwest::Method::POST,
                "/api/auth/register",
                Some(serde_json::json!({"name": "Test Leader", "email": email, "password": "leader123"})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {status} {body}");
        let session = Self::login(server, &email, "leader123").await?;
        Ok((session, body["data"].clone()))
    }

    /// Have the seeded admin create a coordinator, then sign in as them
    pub async fn new_coordinator(server: &'static TestServer) -> Result<(Self, Value)> {
        let admin = Self::login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await?;
        let email = unique_email("coordinator");
        let (status, body) = admin
            .send(
                reqwest::Method::POST,
                "/api/admin/coordinators",
                Some(serde_json::json!({"name": "Test Coordinator", "email": email, "password": "coord123"})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "coordinator creation failed: {status} {body}");
        let session = Self::login(server, &email, "coord123").await?;
        Ok((session, body["data"].clone()))
    }

    pub async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.server.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::DELETE, path, None).await
    }
}
